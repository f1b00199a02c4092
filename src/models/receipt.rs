use crate::models::Item;
use serde::{Deserialize, Serialize};

/// 小票解析结果: 商品行 + 各标签金额 (标签缺失时为 0, 不报错)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    pub items: Vec<Item>,
    pub total_price: u64,
    pub handling_fee: u64,
    pub other_fee: u64,
    pub discount: u64,
    pub discount_plus: u64,
    pub total_payment: u64,
}
