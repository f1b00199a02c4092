use crate::error::{Result, SplitError};
use crate::models::{Bill, ItemClaim};

/// 哨兵伪商品提取 (边界逻辑, 核心算法永远不接触哨兵行)
///
/// 前端沿用小票习惯, 会把 "Total pembayaran" / "Diskon" 这类控制行混进
/// 商品列表。这里在调用 allocator 之前把它们搬进 Bill 的类型化附加字段,
/// 并从商品列表剔除, 同时重映射认领下标。金额 = 数量 * 单价。

/// 哨兵名称 -> 附加字段的归类 (英文标记与小票标签都接受, 不区分大小写)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sentinel {
    TotalPayment,
    Discount,
    DiscountPlus,
    HandlingFee,
    OtherFee,
}

fn classify(name: &str) -> Option<Sentinel> {
    match name.trim().to_lowercase().as_str() {
        "total payment" | "total pembayaran" => Some(Sentinel::TotalPayment),
        "discount plus" | "diskon plus" => Some(Sentinel::DiscountPlus),
        "discount" | "diskon" => Some(Sentinel::Discount),
        "handling fee" | "biaya penanganan dan pengiriman" => Some(Sentinel::HandlingFee),
        "other fee" | "biaya lainnya" => Some(Sentinel::OtherFee),
        _ => None,
    }
}

/// 把商品列表中的哨兵行提取进附加字段, 返回净化后的 Bill
pub fn extract_sentinels(bill: Bill) -> Result<Bill> {
    let Bill {
        session_id,
        items,
        people,
        mut handling_fee,
        mut other_fee,
        mut discount,
        mut discount_plus,
        mut total_payment,
    } = bill;

    // 1. 分类商品行, 构建 旧下标 -> 新下标 映射
    let mut kept = Vec::with_capacity(items.len());
    let mut index_map: Vec<Option<usize>> = Vec::with_capacity(items.len());

    for item in items {
        match classify(&item.name) {
            Some(kind) => {
                let amount = u64::try_from(item.line_cost()).map_err(|_| {
                    SplitError::Validation(format!("sentinel '{}' amount overflows", item.name))
                })?;
                tracing::info!("提取哨兵行 '{}' -> {:?} ({})", item.name, kind, amount);
                match kind {
                    Sentinel::TotalPayment => total_payment = Some(amount),
                    Sentinel::Discount => discount += amount,
                    Sentinel::DiscountPlus => discount_plus += amount,
                    Sentinel::HandlingFee => handling_fee += amount,
                    Sentinel::OtherFee => other_fee += amount,
                }
                index_map.push(None);
            }
            None => {
                index_map.push(Some(kept.len()));
                kept.push(item);
            }
        }
    }

    // 2. 重映射认领下标; 指向哨兵行的认领直接丢弃
    let mut dropped = 0usize;
    let people = people
        .into_iter()
        .map(|mut person| {
            person.claims = person
                .claims
                .into_iter()
                .filter_map(|claim| {
                    if claim.item_index >= index_map.len() {
                        // 越界引用保留原样, 交给 allocator 校验报错
                        return Some(claim);
                    }
                    match index_map[claim.item_index] {
                        Some(new_index) => Some(ItemClaim {
                            item_index: new_index,
                            quantity: claim.quantity,
                        }),
                        None => {
                            dropped += 1;
                            None
                        }
                    }
                })
                .collect();
            person
        })
        .collect();

    if dropped > 0 {
        tracing::warn!("丢弃 {} 条指向哨兵行的认领", dropped);
    }

    Ok(Bill {
        session_id,
        items: kept,
        people,
        handling_fee,
        other_fee,
        discount,
        discount_plus,
        total_payment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, PersonClaim};

    fn item(name: &str, quantity: u64, unit_price: u64) -> Item {
        Item {
            name: name.to_string(),
            quantity,
            unit_price,
        }
    }

    fn base_bill(items: Vec<Item>, people: Vec<PersonClaim>) -> Bill {
        Bill {
            session_id: "test".to_string(),
            items,
            people,
            handling_fee: 0,
            other_fee: 0,
            discount: 0,
            discount_plus: 0,
            total_payment: None,
        }
    }

    #[test]
    fn sentinel_rows_move_into_typed_fields() {
        let b = base_bill(
            vec![
                item("Nasi Goreng", 1, 25000),
                item("Biaya penanganan dan pengiriman", 1, 8000),
                item("Biaya lainnya", 1, 2000),
                item("Diskon", 1, 5000),
                item("Diskon PLUS", 1, 1000),
                item("Total pembayaran", 1, 29000),
            ],
            vec![],
        );

        let cleaned = extract_sentinels(b).unwrap();
        assert_eq!(cleaned.items, vec![item("Nasi Goreng", 1, 25000)]);
        assert_eq!(cleaned.handling_fee, 8000);
        assert_eq!(cleaned.other_fee, 2000);
        assert_eq!(cleaned.discount, 5000);
        assert_eq!(cleaned.discount_plus, 1000);
        assert_eq!(cleaned.total_payment, Some(29000));
    }

    #[test]
    fn english_markers_match_case_insensitively() {
        let b = base_bill(
            vec![
                item("Ayam Geprek", 2, 15000),
                item("HANDLING FEE", 1, 4000),
                item("Discount Plus", 1, 500),
                item("Total Payment", 1, 33500),
            ],
            vec![],
        );

        let cleaned = extract_sentinels(b).unwrap();
        assert_eq!(cleaned.items.len(), 1);
        assert_eq!(cleaned.handling_fee, 4000);
        assert_eq!(cleaned.discount_plus, 500);
        assert_eq!(cleaned.total_payment, Some(33500));
    }

    #[test]
    fn sentinel_amount_is_quantity_times_unit_price() {
        let b = base_bill(vec![item("Diskon", 2, 1500)], vec![]);
        let cleaned = extract_sentinels(b).unwrap();
        assert_eq!(cleaned.discount, 3000);
    }

    #[test]
    fn claim_indices_are_remapped_after_removal() {
        let b = base_bill(
            vec![
                item("Diskon", 1, 2000),
                item("Sate Ayam", 1, 20000),
                item("Total pembayaran", 1, 18000),
                item("Es Campur", 1, 9000),
            ],
            vec![PersonClaim {
                name: "Budi".to_string(),
                claims: vec![
                    ItemClaim {
                        item_index: 1,
                        quantity: 1,
                    },
                    ItemClaim {
                        item_index: 3,
                        quantity: 1,
                    },
                ],
            }],
        );

        let cleaned = extract_sentinels(b).unwrap();
        assert_eq!(
            cleaned.items,
            vec![item("Sate Ayam", 1, 20000), item("Es Campur", 1, 9000)]
        );
        let claims = &cleaned.people[0].claims;
        assert_eq!(claims[0].item_index, 0);
        assert_eq!(claims[1].item_index, 1);
    }

    #[test]
    fn claims_on_sentinel_rows_are_dropped() {
        let b = base_bill(
            vec![item("Diskon", 1, 2000), item("Bakmi", 1, 22000)],
            vec![PersonClaim {
                name: "Citra".to_string(),
                claims: vec![
                    ItemClaim {
                        item_index: 0,
                        quantity: 1,
                    },
                    ItemClaim {
                        item_index: 1,
                        quantity: 1,
                    },
                ],
            }],
        );

        let cleaned = extract_sentinels(b).unwrap();
        assert_eq!(cleaned.people[0].claims.len(), 1);
        assert_eq!(cleaned.people[0].claims[0].item_index, 0);
    }

    #[test]
    fn out_of_range_claims_pass_through_for_allocator_to_reject() {
        let b = base_bill(
            vec![item("Bakmi", 1, 22000)],
            vec![PersonClaim {
                name: "Dewi".to_string(),
                claims: vec![ItemClaim {
                    item_index: 9,
                    quantity: 1,
                }],
            }],
        );

        let cleaned = extract_sentinels(b).unwrap();
        assert_eq!(cleaned.people[0].claims[0].item_index, 9);
    }

    #[test]
    fn ordinary_items_are_untouched() {
        let b = base_bill(
            vec![item("Diskon Spesial Merdeka", 1, 7000)],
            vec![],
        );
        // 名称只部分含 "diskon", 不是哨兵, 保持原样
        let cleaned = extract_sentinels(b).unwrap();
        assert_eq!(cleaned.items.len(), 1);
        assert_eq!(cleaned.discount, 0);
    }
}
