use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "storefront-cli",
    version,
    about = "Search, filter and browse storefront products from the command line"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the product-search API
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds (default: 10)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for products and filter the results
    Search {
        /// Search keyword (empty lists everything)
        #[arg(default_value = "")]
        keyword: String,

        /// Pages of 50 to load ("show more" count + 1)
        #[arg(long, default_value = "1")]
        pages: u32,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show search suggestions for a query
    Suggest {
        /// Partial search text
        #[arg(default_value = "")]
        query: String,

        /// Read keystrokes line by line from stdin and print debounced suggestions
        #[arg(long)]
        interactive: bool,
    },

    /// List the available filter options
    Facets {
        /// Only list brands containing this text
        #[arg(long)]
        brand_search: Option<String>,

        /// Only list values of attribute CODE containing TEXT, as CODE=TEXT (repeatable)
        #[arg(long = "attr-search", value_parser = parse_attr)]
        attr_search: Vec<(String, String)>,

        /// Show every brand and attribute value instead of the first 10
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show one product from a search
    Product {
        /// Product ID as shown in search results
        id: String,

        /// Keyword of the search the product appeared in
        #[arg(long, default_value = "")]
        keyword: String,

        /// Pages of 50 to scan for the product
        #[arg(long, default_value = "1")]
        pages: u32,

        /// Only show one section
        #[arg(long, value_enum)]
        section: Option<Section>,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct FilterArgs {
    /// Keep only this brand (repeatable)
    #[arg(long = "brand")]
    pub brands: Vec<String>,

    /// Minimum star rating, e.g. 4 (repeatable)
    #[arg(long = "rating")]
    pub ratings: Vec<u8>,

    /// Only products available in store
    #[arg(long)]
    pub in_store: bool,

    /// Only products with same-day delivery
    #[arg(long)]
    pub same_day: bool,

    /// Price bucket (repeatable)
    #[arg(long = "price", value_enum)]
    pub prices: Vec<PriceBucket>,

    /// Lower bound of a custom price range
    #[arg(long)]
    pub min: Option<String>,

    /// Upper bound of a custom price range
    #[arg(long)]
    pub max: Option<String>,

    /// Attribute filter as CODE=VALUE (repeatable)
    #[arg(long = "attr", value_parser = parse_attr)]
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriceBucket {
    /// Under 2,000
    #[value(name = "under25")]
    Under25,
    /// 2,000 to 4,000
    #[value(name = "from25to50")]
    From25to50,
    /// 4,000 to 8,000
    #[value(name = "from50to100")]
    From50to100,
    /// Above 8,000
    #[value(name = "above100")]
    Above100,
}

impl PriceBucket {
    pub fn option_key(self) -> &'static str {
        match self {
            Self::Under25 => "under25",
            Self::From25to50 => "from25to50",
            Self::From50to100 => "from50to100",
            Self::Above100 => "above100",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Overview,
    Description,
    Ingredients,
    Usage,
    Attributes,
    Tags,
}

impl Section {
    pub const ALL: &'static [Section] = &[
        Section::Overview,
        Section::Description,
        Section::Ingredients,
        Section::Usage,
        Section::Attributes,
        Section::Tags,
    ];
}

fn parse_attr(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((code, value)) if !code.trim().is_empty() && !value.is_empty() => {
            Ok((code.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected CODE=VALUE, got '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_with_filters() {
        let cli = Cli::try_parse_from([
            "storefront-cli",
            "search",
            "lipstick",
            "--brand",
            "Lakme",
            "--brand",
            "Nykaa",
            "--rating",
            "4",
            "--price",
            "from25to50",
            "--min",
            "100",
            "--attr",
            "shade=Red",
            "--in-store",
            "--pages",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Search { keyword, pages, filters } => {
                assert_eq!(keyword, "lipstick");
                assert_eq!(pages, 3);
                assert_eq!(filters.brands, vec!["Lakme", "Nykaa"]);
                assert_eq!(filters.ratings, vec![4]);
                assert_eq!(filters.prices, vec![PriceBucket::From25to50]);
                assert_eq!(filters.min.as_deref(), Some("100"));
                assert_eq!(
                    filters.attributes,
                    vec![("shade".to_string(), "Red".to_string())]
                );
                assert!(filters.in_store);
                assert!(!filters.same_day);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn rejects_malformed_attribute() {
        assert!(Cli::try_parse_from(["storefront-cli", "search", "--attr", "shade"]).is_err());
        assert!(parse_attr("=Red").is_err());
        assert_eq!(parse_attr("finish=a=b").unwrap(), ("finish".into(), "a=b".into()));
    }

    #[test]
    fn facets_take_attribute_searches_and_filters() {
        let cli = Cli::try_parse_from([
            "storefront-cli",
            "facets",
            "--attr-search",
            "shade=red",
            "--attr-search",
            "finish=mat",
            "--brand",
            "Lakme",
        ])
        .unwrap();
        match cli.command {
            Commands::Facets { attr_search, filters, all, .. } => {
                assert_eq!(
                    attr_search,
                    vec![
                        ("shade".to_string(), "red".to_string()),
                        ("finish".to_string(), "mat".to_string())
                    ]
                );
                assert_eq!(filters.brands, vec!["Lakme"]);
                assert!(!all);
            }
            _ => panic!("expected facets"),
        }
    }

    #[test]
    fn product_section_is_a_value_enum() {
        let cli = Cli::try_parse_from([
            "storefront-cli",
            "product",
            "p1",
            "--section",
            "usage",
        ])
        .unwrap();
        match cli.command {
            Commands::Product { id, section, .. } => {
                assert_eq!(id, "p1");
                assert_eq!(section, Some(Section::Usage));
            }
            _ => panic!("expected product"),
        }
    }
}
