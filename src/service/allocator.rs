use crate::error::{Result, SplitError};
use crate::models::{Bill, PersonResult};

/// 分账核心算法: 按认领金额占比分摊附加费/折扣, 并做精确到分的对账
///
/// 纯函数, 无副作用, 同一输入必然得到同一输出。守住的三条不变量:
/// 1. 守恒: 所有人应付之和 == 目标总额 (total_payment)
/// 2. 比例公平: 附加费净额按各人原始小计占比分摊
/// 3. 舍入确定性: 余差固定记入输入顺序的最后一人
///
/// 超额认领不拒绝 (宽松策略): 按原始认领数量分摊成本, 即使超过购买数量。
pub fn allocate(bill: &Bill) -> Result<Vec<PersonResult>> {
    validate(bill)?;

    // 没有参与者就没有可分配对象, 直接返回空列表
    if bill.people.is_empty() {
        return Ok(Vec::new());
    }

    // 1. 商品小计 (全量, 含未认领部分) 与附加费净额
    let bill_subtotal = bill.item_subtotal();
    let ancillary = bill.ancillary_adjustment();

    // 2. 目标总额: 显式 total_payment 优先, 否则由小计推导
    let target = bill.target_total();

    // 3. 每人原始小计 = Σ 认领数量 * 对应商品单价
    let raw_subtotals: Vec<i128> = bill
        .people
        .iter()
        .map(|person| {
            person
                .claims
                .iter()
                .map(|c| c.quantity as i128 * bill.items[c.item_index].unit_price as i128)
                .sum()
        })
        .collect();

    // 4. 每人毛应付 = 原始小计 + 按占比分摊的附加费净额 (四舍五入, 远离零)
    //    小计为 0 时无法计算占比, 附加费在所有参与者间均摊
    let mut totals: Vec<i128> = if bill_subtotal == 0 {
        let n = bill.people.len() as i128;
        raw_subtotals
            .iter()
            .map(|raw| raw + div_round_half_away(ancillary, n))
            .collect()
    } else {
        raw_subtotals
            .iter()
            .map(|raw| raw + div_round_half_away(ancillary * raw, bill_subtotal))
            .collect()
    };

    // 5. 对账: 逐人舍入后的和未必等于目标总额, 余差记入最后一人。
    //    未认领商品的成本和 total_payment 覆盖值带来的差额也在这里收口。
    let allocated: i128 = totals.iter().sum();
    let residual = target - allocated;
    if residual != 0 {
        if let Some(last) = totals.last_mut() {
            *last += residual;
        }
    }

    // 6. 按输入顺序组装结果, 认领明细原样回显
    bill.people
        .iter()
        .zip(totals)
        .map(|(person, total)| {
            let total = i64::try_from(total).map_err(|_| {
                SplitError::Validation(format!("total for '{}' overflows", person.name))
            })?;
            Ok(PersonResult {
                name: person.name.clone(),
                total,
                claims: person.claims.clone(),
            })
        })
        .collect()
}

/// 前置校验: 首个违例立即报错, 不做部分计算
fn validate(bill: &Bill) -> Result<()> {
    for (idx, item) in bill.items.iter().enumerate() {
        if item.name.trim().is_empty() {
            return Err(SplitError::Validation(format!(
                "item {} has an empty name",
                idx
            )));
        }
        if item.quantity == 0 {
            return Err(SplitError::Validation(format!(
                "item '{}' has zero quantity",
                item.name
            )));
        }
    }

    for person in &bill.people {
        for claim in &person.claims {
            if claim.item_index >= bill.items.len() {
                return Err(SplitError::Validation(format!(
                    "unknown item reference {} for '{}'",
                    claim.item_index, person.name
                )));
            }
            if claim.quantity == 0 {
                return Err(SplitError::Validation(format!(
                    "zero claim quantity for '{}'",
                    person.name
                )));
            }
        }
    }

    Ok(())
}

/// 整数除法, 四舍五入远离零 (den > 0)
fn div_round_half_away(num: i128, den: i128) -> i128 {
    debug_assert!(den > 0);
    if num >= 0 {
        (num * 2 + den) / (den * 2)
    } else {
        (num * 2 - den) / (den * 2)
    }
}
