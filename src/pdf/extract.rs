use crate::error::{Result, SplitError};
use crate::models::{Item, ParsedReceipt};
use lopdf::Document;
use regex::Regex;
use tracing::info;

/// GoFood 小票抓取器 (厂商专用格式, 边界协作者)
///
/// 解析流程: lopdf 结构校验 -> pdf-extract 提文本 -> 正则扫描。
/// 文档本身解析失败报 Extraction 错误; 文本里找不到某个标签时
/// 该项金额记 0, 不报错 (沿用参考实现的行为, 已知局限)。

/// 主入口: 原始 PDF 字节 -> 解析结果
pub fn extract_receipt(pdf_bytes: &[u8]) -> Result<ParsedReceipt> {
    // 1. 结构校验: 连 PDF 都不是就直接拒绝
    if let Err(e) = Document::load_mem(pdf_bytes) {
        return Err(SplitError::Extraction(format!("failed to parse PDF: {e}")));
    }

    // 2. 全文提取
    let text = pdf_extract::extract_text_from_mem(pdf_bytes)
        .map_err(|e| SplitError::Extraction(format!("failed to extract text: {e}")))?;

    // 3. 纯文本扫描
    let receipt = parse_receipt_text(&text);
    info!(
        "小票解析完成: {} 个商品行, total_payment={}",
        receipt.items.len(),
        receipt.total_payment
    );
    Ok(receipt)
}

/// 对提取出的小票文本做正则扫描 (独立出来方便测试)
pub fn parse_receipt_text(text: &str) -> ParsedReceipt {
    let lines: Vec<&str> = text.lines().collect();
    let (discount, discount_plus) = discount_amounts(text);

    ParsedReceipt {
        items: parse_items(&lines),
        total_price: labeled_amount("Total harga", text),
        handling_fee: labeled_amount("Biaya penanganan dan pengiriman", text),
        other_fee: labeled_amount("Biaya lainnya", text),
        discount,
        discount_plus,
        total_payment: labeled_amount("Total pembayaran", text),
    }
}

/// 商品行扫描: "数量 名称" (名称可跨多行), 然后 "@Rp单价", 然后 "Rp行金额"
fn parse_items(lines: &[&str]) -> Vec<Item> {
    let (Ok(item_re), Ok(unit_re), Ok(total_re)) = (
        Regex::new(r"^(\d+)\s(.+)"),
        Regex::new(r"^@Rp([\d.]+)$"),
        Regex::new(r"^Rp([\d.]+)$"),
    ) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        if let Some(caps) = item_re.captures(line) {
            if let Ok(quantity) = caps[1].parse::<u64>() {
                let mut name = caps[2].trim().to_string();

                // 名称可能折行, 一直拼接到单价行为止
                let mut j = i + 1;
                while j < lines.len() && !unit_re.is_match(lines[j].trim()) {
                    name.push(' ');
                    name.push_str(lines[j].trim());
                    j += 1;
                }

                // 单价行后面必须紧跟行金额, 否则不是商品块
                if j + 1 < lines.len() {
                    let unit_caps = unit_re.captures(lines[j].trim());
                    let has_line_total = total_re.is_match(lines[j + 1].trim());
                    if let (Some(uc), true) = (unit_caps, has_line_total) {
                        if let Some(unit_price) = parse_rupiah(&uc[1]) {
                            items.push(Item {
                                name,
                                quantity,
                                unit_price,
                            });
                            i = j + 2;
                            continue;
                        }
                    }
                }
            }
        }
        i += 1;
    }
    items
}

/// 标签金额: "标签 ... Rp1.234.567" (点为千分位), 找不到记 0
fn labeled_amount(label: &str, text: &str) -> u64 {
    let Ok(re) = Regex::new(&format!(r"{label}\s*-?Rp([\d.]+)")) else {
        return 0;
    };
    re.captures(text)
        .and_then(|c| parse_rupiah(&c[1]))
        .unwrap_or(0)
}

/// "Diskon" 与 "Diskon PLUS" 共用前缀, 按是否带 PLUS 分别取首个匹配
fn discount_amounts(text: &str) -> (u64, u64) {
    let Ok(re) = Regex::new(r"Diskon( PLUS)?\s*-?Rp([\d.]+)") else {
        return (0, 0);
    };

    let mut discount = 0;
    let mut discount_plus = 0;
    for caps in re.captures_iter(text) {
        let amount = parse_rupiah(&caps[2]).unwrap_or(0);
        if caps.get(1).is_some() {
            if discount_plus == 0 {
                discount_plus = amount;
            }
        } else if discount == 0 {
            discount = amount;
        }
    }
    (discount, discount_plus)
}

fn parse_rupiah(raw: &str) -> Option<u64> {
    raw.replace('.', "").parse().ok()
}
