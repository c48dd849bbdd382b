mod crawl;

pub use crawl::{crawl_ranking, RankingConfig};

use serde::{Deserialize, Serialize};

pub const DEFAULT_RANKING_URL: &str =
    "https://shopping.naver.com/promotion?type=RANKING&categoryId=50000000";
pub const DEFAULT_CONTAINER_ID: &str = "promotion_module_list";
pub const CONTAINER_ID_PREFIX: &str = "promotion_module";

/// One `li` of the ranking list as it stood in the final snapshot. `idx`
/// is the 1-based position in the list, not a dedup key; the page may
/// repeat entries and they are kept as served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItemRecord {
    pub idx: u32,
    pub text: String,
    pub raw_markup: String,
}
