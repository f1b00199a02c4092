use crate::error::{Result, SplitError};
use crate::models::{Bill, PersonResult};
use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// 结算单渲染器 (边界协作者): 消费 allocator 的输出, 产出可打印 PDF
///
/// 版式: 标题 + 账单汇总块 + 每人一段 (应付总额与认领明细)。
/// 内容超出一页时续页。所有金额整型, 千分位用点, 沿用小票习惯。

// A4 纵向
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_LEFT: f32 = 50.0;
const MARGIN_TOP: f32 = 792.0;
const MARGIN_BOTTOM: f32 = 50.0;

/// 一行待排文本: 字号 + 是否加粗 + 左缩进
struct Line {
    text: String,
    size: i64,
    bold: bool,
    indent: f32,
}

impl Line {
    fn new(text: impl Into<String>, size: i64, bold: bool, indent: f32) -> Self {
        Self {
            text: text.into(),
            size,
            bold,
            indent,
        }
    }

    fn height(&self) -> f32 {
        self.size as f32 * 1.45
    }
}

/// 渲染入口: Bill + 分账结果 -> PDF 字节
pub fn render_settlement(bill: &Bill, results: &[PersonResult]) -> Result<Vec<u8>> {
    let lines = layout(bill, results);
    build_document(&lines)
}

/// 组装全部文本行 (与排版解耦, 方便测试)
fn layout(bill: &Bill, results: &[PersonResult]) -> Vec<Line> {
    let mut lines = Vec::new();

    lines.push(Line::new("Split Summary", 18, true, 0.0));
    lines.push(Line::new(format!("Session: {}", bill.session_id), 10, false, 0.0));
    lines.push(Line::new(
        format!("Tanggal: {}", Local::now().format("%Y-%m-%d %H:%M")),
        10,
        false,
        0.0,
    ));
    lines.push(Line::new("", 10, false, 0.0));

    // 账单汇总
    lines.push(Line::new("Ringkasan Tagihan", 12, true, 0.0));
    lines.push(Line::new(
        format!("Total harga: {}", format_rupiah(bill.item_subtotal())),
        10,
        false,
        10.0,
    ));
    lines.push(Line::new(
        format!(
            "Biaya penanganan dan pengiriman: {}",
            format_rupiah(bill.handling_fee as i128)
        ),
        10,
        false,
        10.0,
    ));
    lines.push(Line::new(
        format!("Biaya lainnya: {}", format_rupiah(bill.other_fee as i128)),
        10,
        false,
        10.0,
    ));
    lines.push(Line::new(
        format!("Diskon: {}", format_rupiah(-(bill.discount as i128))),
        10,
        false,
        10.0,
    ));
    lines.push(Line::new(
        format!(
            "Diskon PLUS: {}",
            format_rupiah(-(bill.discount_plus as i128))
        ),
        10,
        false,
        10.0,
    ));
    lines.push(Line::new(
        format!("Total pembayaran: {}", format_rupiah(bill.target_total())),
        10,
        true,
        10.0,
    ));
    lines.push(Line::new("", 10, false, 0.0));

    // 每人一段
    for result in results {
        lines.push(Line::new(
            format!("{}  {}", result.name, format_rupiah(result.total as i128)),
            12,
            true,
            0.0,
        ));
        for claim in &result.claims {
            // 结果由 allocator 产出, 下标应当有效; 防御性跳过未知引用
            let Some(item) = bill.items.get(claim.item_index) else {
                continue;
            };
            let line_total = claim.quantity as i128 * item.unit_price as i128;
            lines.push(Line::new(
                format!(
                    "{} x {} @ {} = {}",
                    claim.quantity,
                    item.name,
                    format_rupiah(item.unit_price as i128),
                    format_rupiah(line_total)
                ),
                10,
                false,
                10.0,
            ));
        }
        if result.claims.is_empty() {
            lines.push(Line::new("(tidak ada item)", 10, false, 10.0));
        }
        lines.push(Line::new("", 10, false, 0.0));
    }

    lines
}

/// 逐页排版并写出 PDF (单字体对: Helvetica / Helvetica-Bold)
fn build_document(lines: &[Line]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_regular,
            "F2" => font_bold,
        },
    });

    // 分页: 超过下边距就换页
    let mut page_ids: Vec<Object> = Vec::new();
    let mut operations: Vec<Operation> = Vec::new();
    let mut y = MARGIN_TOP;

    let flush_page =
        |doc: &mut Document, page_ids: &mut Vec<Object>, operations: Vec<Operation>| -> Result<()> {
            let content = Content { operations };
            let encoded = content
                .encode()
                .map_err(|e| SplitError::Render(format!("failed to encode content: {e}")))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id.into());
            Ok(())
        };

    for line in lines {
        if y < MARGIN_BOTTOM + line.height() {
            flush_page(&mut doc, &mut page_ids, std::mem::take(&mut operations))?;
            y = MARGIN_TOP;
        }
        y -= line.height();

        if line.text.is_empty() {
            continue;
        }

        let font = if line.bold { "F2" } else { "F1" };
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![font.into(), line.size.into()]));
        operations.push(Operation::new(
            "Td",
            vec![(MARGIN_LEFT + line.indent).into(), y.into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.text.as_str())],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    flush_page(&mut doc, &mut page_ids, operations)?;

    let count = page_ids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| SplitError::Render(format!("failed to save PDF: {e}")))?;
    Ok(buffer)
}

/// 金额格式化: 点做千分位, 负数前置减号, 如 -Rp5.000
fn format_rupiah(amount: i128) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{sign}Rp{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, ItemClaim};

    fn sample_bill() -> Bill {
        Bill {
            session_id: "abc123".to_string(),
            items: vec![Item {
                name: "Nasi Goreng".to_string(),
                quantity: 2,
                unit_price: 25000,
            }],
            people: Vec::new(),
            handling_fee: 8000,
            other_fee: 0,
            discount: 3000,
            discount_plus: 0,
            total_payment: None,
        }
    }

    #[test]
    fn renders_a_pdf_document() {
        let results = vec![PersonResult {
            name: "Andi".to_string(),
            total: 55000,
            claims: vec![ItemClaim {
                item_index: 0,
                quantity: 2,
            }],
        }];

        let bytes = render_settlement(&sample_bill(), &results).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_result_lists_paginate() {
        let results: Vec<PersonResult> = (0..200)
            .map(|i| PersonResult {
                name: format!("Orang {i}"),
                total: 1000,
                claims: Vec::new(),
            })
            .collect();

        let bytes = render_settlement(&sample_bill(), &results).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn format_rupiah_groups_thousands_with_dots() {
        assert_eq!(format_rupiah(0), "Rp0");
        assert_eq!(format_rupiah(999), "Rp999");
        assert_eq!(format_rupiah(1000), "Rp1.000");
        assert_eq!(format_rupiah(25000), "Rp25.000");
        assert_eq!(format_rupiah(1234567), "Rp1.234.567");
        assert_eq!(format_rupiah(-5000), "-Rp5.000");
    }
}
