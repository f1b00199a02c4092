use crate::models::ItemClaim;
use serde::{Deserialize, Serialize};

/// 每人分账结果: 应付总额 + 原样回显的认领明细 (供渲染层逐项展示)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonResult {
    pub name: String,
    pub total: i64, // 应付金额, 最小货币单位
    #[serde(rename = "items")]
    pub claims: Vec<ItemClaim>,
}
