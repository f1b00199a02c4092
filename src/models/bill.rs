use serde::{Deserialize, Serialize};

/// 账单商品行: 名称 + 购买数量 + 单价 (最小货币单位, 印尼盾无小数)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub quantity: u64,   // 购买总数量, 必须 >= 1
    pub unit_price: u64, // 单价, 最小货币单位
}

impl Item {
    /// 整行金额 = 数量 * 单价 (i128 防溢出)
    pub fn line_cost(&self) -> i128 {
        self.quantity as i128 * self.unit_price as i128
    }
}

/// 单人对单个商品的认领: 按下标引用商品, 名称可能重复
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemClaim {
    pub item_index: usize,
    pub quantity: u64, // 认领数量, 必须 >= 1
}

/// 一位参与者及其认领列表 (wire 字段名沿用前端契约 "items")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonClaim {
    pub name: String,
    #[serde(rename = "items")]
    pub claims: Vec<ItemClaim>,
}

/// 完整的分账请求: 商品 + 参与者认领 + 附加费用/折扣
///
/// 四个附加字段缺省为 0; total_payment 为显式覆盖值, 缺省或为 0 时
/// 由商品小计与附加费净额推导 (见 allocator)。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub session_id: String, // 仅用于输出文件命名, 不做解释
    pub items: Vec<Item>,
    #[serde(rename = "assignments")]
    pub people: Vec<PersonClaim>,
    #[serde(default)]
    pub handling_fee: u64,
    #[serde(default)]
    pub other_fee: u64,
    #[serde(default)]
    pub discount: u64,
    #[serde(default)]
    pub discount_plus: u64,
    #[serde(default)]
    pub total_payment: Option<u64>,
}

impl Bill {
    /// 商品小计 = 全部商品行金额之和 (与认领情况无关)
    pub fn item_subtotal(&self) -> i128 {
        self.items.iter().map(Item::line_cost).sum()
    }

    /// 附加费净额 = 费用相加, 折扣相减, 可能为负
    pub fn ancillary_adjustment(&self) -> i128 {
        self.handling_fee as i128 + self.other_fee as i128
            - self.discount as i128
            - self.discount_plus as i128
    }

    /// 目标总额: 显式 total_payment 优先, 否则 小计 + 附加费净额
    pub fn target_total(&self) -> i128 {
        match self.total_payment {
            Some(t) if t != 0 => t as i128,
            _ => self.item_subtotal() + self.ancillary_adjustment(),
        }
    }
}
