use crate::events::{Listeners, Subscription};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies one filter section. Anything that isn't a built-in section is
/// a dynamic product attribute keyed by its attribute code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKey {
    Brand,
    Rating,
    Delivery,
    Price,
    Attribute(String),
}

impl SectionKey {
    pub fn parse(key: &str) -> Self {
        match key {
            "brand" => Self::Brand,
            "rating" => Self::Rating,
            "delivery" => Self::Delivery,
            "price" => Self::Price,
            other => Self::Attribute(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Brand => "brand",
            Self::Rating => "rating",
            Self::Delivery => "delivery",
            Self::Price => "price",
            Self::Attribute(code) => code,
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceToggle {
    Under25,
    From25To50,
    From50To100,
    Above100,
    Custom,
}

impl PriceToggle {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "under25" => Some(Self::Under25),
            "from25to50" => Some(Self::From25To50),
            "from50to100" => Some(Self::From50To100),
            "above100" => Some(Self::Above100),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBound {
    Min,
    Max,
}

/// The price section: four fixed buckets plus a custom range whose bounds
/// are kept as the raw text the user typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceFilter {
    pub under25: bool,
    pub from25to50: bool,
    pub from50to100: bool,
    pub above100: bool,
    pub custom: bool,
    pub min: String,
    pub max: String,
}

impl PriceFilter {
    pub fn is_active(&self) -> bool {
        self.under25 || self.from25to50 || self.from50to100 || self.above100 || self.custom
    }

    pub fn toggle(&mut self, which: PriceToggle) {
        let flag = match which {
            PriceToggle::Under25 => &mut self.under25,
            PriceToggle::From25To50 => &mut self.from25to50,
            PriceToggle::From50To100 => &mut self.from50to100,
            PriceToggle::Above100 => &mut self.above100,
            PriceToggle::Custom => &mut self.custom,
        };
        *flag = !*flag;
    }

    pub fn set_bound(&mut self, bound: PriceBound, value: impl Into<String>) {
        match bound {
            PriceBound::Min => self.min = value.into(),
            PriceBound::Max => self.max = value.into(),
        }
    }
}

/// The user's current facet selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    options: BTreeMap<SectionKey, BTreeMap<String, bool>>,
    price: Option<PriceFilter>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one option. For `SectionKey::Price` the option names a bucket
    /// toggle; unknown price options are ignored.
    pub fn toggle(&mut self, section: &SectionKey, option: &str) {
        if *section == SectionKey::Price {
            match PriceToggle::parse(option) {
                Some(which) => self.price.get_or_insert_with(Default::default).toggle(which),
                None => tracing::debug!("Ignoring unknown price option '{}'", option),
            }
            return;
        }
        let selected = self
            .options
            .entry(section.clone())
            .or_default()
            .entry(option.to_string())
            .or_insert(false);
        *selected = !*selected;
    }

    pub fn set_price(&mut self, price: PriceFilter) {
        self.price = Some(price);
    }

    pub fn price(&self) -> Option<&PriceFilter> {
        self.price.as_ref()
    }

    pub fn is_selected(&self, section: &SectionKey, option: &str) -> bool {
        self.options
            .get(section)
            .and_then(|opts| opts.get(option))
            .copied()
            .unwrap_or(false)
    }

    /// Option sections in key order, with only their selected option keys.
    pub fn option_sections(&self) -> impl Iterator<Item = (&SectionKey, Vec<&str>)> {
        self.options.iter().map(|(key, opts)| {
            let selected = opts
                .iter()
                .filter(|(_, on)| **on)
                .map(|(k, _)| k.as_str())
                .collect();
            (key, selected)
        })
    }

    /// True when some section would constrain the result set.
    pub fn has_active_selection(&self) -> bool {
        self.options.values().any(|opts| opts.values().any(|on| *on))
            || self.price.as_ref().is_some_and(PriceFilter::is_active)
    }
}

/// Owns the live `FilterState` and tells subscribers about every committed
/// change. Custom price bounds are edited on a draft and only reach the
/// state through `apply_custom_price` or the next bucket toggle.
pub struct FilterStore {
    state: FilterState,
    draft_price: PriceFilter,
    listeners: Listeners<FilterState>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self {
            state: FilterState::new(),
            draft_price: PriceFilter::default(),
            listeners: Listeners::new(),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn subscribe(&self, callback: impl Fn(&FilterState) + Send + Sync + 'static) -> Subscription {
        self.listeners.subscribe(callback)
    }

    pub fn toggle(&mut self, section: &SectionKey, option: &str) {
        if *section == SectionKey::Price {
            let Some(which) = PriceToggle::parse(option) else {
                tracing::debug!("Ignoring unknown price option '{}'", option);
                return;
            };
            self.draft_price.toggle(which);
            // Ticking "custom" only reveals the range inputs.
            if which != PriceToggle::Custom {
                self.commit_price();
            }
            return;
        }
        self.state.toggle(section, option);
        self.notify();
    }

    pub fn set_price_bound(&mut self, bound: PriceBound, value: impl Into<String>) {
        self.draft_price.set_bound(bound, value);
    }

    pub fn apply_custom_price(&mut self) {
        self.commit_price();
    }

    fn commit_price(&mut self) {
        self.state.set_price(self.draft_price.clone());
        self.notify();
    }

    fn notify(&self) {
        if self.listeners.is_empty() {
            return;
        }
        tracing::debug!(
            "Filter state changed, notifying {} listener(s): {:?}",
            self.listeners.len(),
            self.state
        );
        self.listeners.emit(&self.state);
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn section_keys_round_trip_through_names() {
        assert_eq!(SectionKey::parse("brand"), SectionKey::Brand);
        assert_eq!(SectionKey::parse("price"), SectionKey::Price);
        assert_eq!(
            SectionKey::parse("shade"),
            SectionKey::Attribute("shade".to_string())
        );
        assert_eq!(SectionKey::Attribute("finish".into()).as_str(), "finish");
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut state = FilterState::new();
        state.toggle(&SectionKey::Brand, "Lakme");
        assert!(state.is_selected(&SectionKey::Brand, "Lakme"));
        assert!(state.has_active_selection());
        state.toggle(&SectionKey::Brand, "Lakme");
        assert!(!state.is_selected(&SectionKey::Brand, "Lakme"));
        assert!(!state.has_active_selection());
    }

    #[test]
    fn price_toggle_routes_to_price_filter() {
        let mut state = FilterState::new();
        state.toggle(&SectionKey::Price, "from25to50");
        assert!(state.price().unwrap().from25to50);
        state.toggle(&SectionKey::Price, "bogus");
        assert!(state.price().unwrap().from25to50);
    }

    #[test]
    fn store_notifies_on_every_toggle() {
        let mut store = FilterStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();
        let _sub = store.subscribe(move |state| {
            seen_cb
                .lock()
                .unwrap()
                .push(state.is_selected(&SectionKey::Delivery, "inStore"));
        });

        store.toggle(&SectionKey::Delivery, "inStore");
        store.toggle(&SectionKey::Delivery, "inStore");
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn custom_price_waits_for_apply() {
        let mut store = FilterStore::new();
        let count = Arc::new(Mutex::new(0));
        let count_cb = count.clone();
        let _sub = store.subscribe(move |_| *count_cb.lock().unwrap() += 1);

        store.toggle(&SectionKey::Price, "custom");
        store.set_price_bound(PriceBound::Min, "100");
        store.set_price_bound(PriceBound::Max, "500");
        assert_eq!(*count.lock().unwrap(), 0);
        assert!(store.state().price().is_none());

        store.apply_custom_price();
        assert_eq!(*count.lock().unwrap(), 1);
        let price = store.state().price().unwrap();
        assert!(price.custom);
        assert_eq!(price.min, "100");
        assert_eq!(price.max, "500");
    }

    #[test]
    fn bucket_toggle_commits_draft_bounds() {
        let mut store = FilterStore::new();
        store.set_price_bound(PriceBound::Max, "900");
        store.toggle(&SectionKey::Price, "under25");
        let price = store.state().price().unwrap();
        assert!(price.under25);
        assert_eq!(price.max, "900");
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let mut store = FilterStore::new();
        let count = Arc::new(Mutex::new(0));
        let count_cb = count.clone();
        let sub = store.subscribe(move |_| *count_cb.lock().unwrap() += 1);
        store.toggle(&SectionKey::Rating, "4");
        drop(sub);
        store.toggle(&SectionKey::Rating, "3");
        assert_eq!(*count.lock().unwrap(), 1);
    }
}
