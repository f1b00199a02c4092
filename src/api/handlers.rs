use crate::error::SplitError;
use crate::models::Bill;
use crate::pdf;
use crate::service;
use axum::{
    extract::{Json, Multipart},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, info};

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// 错误分类 -> 状态码: 校验失败是客户端错误, 其余一律 500
fn error_response(err: &SplitError) -> Response {
    let status = match err {
        SplitError::Validation(_) => StatusCode::BAD_REQUEST,
        SplitError::Extraction(_) | SplitError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ErrorResponse {
        success: false,
        message: err.to_string(),
    };
    (status, Json(body)).into_response()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 仅计算接口: Bill -> 每人应付列表
pub async fn split(Json(bill): Json<Bill>) -> Response {
    info!(
        "分账请求: session={}, {} 个商品, {} 位参与者",
        bill.session_id,
        bill.items.len(),
        bill.people.len()
    );

    match service::allocate(&bill) {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(e) => {
            error!("Split failed for session {}: {}", bill.session_id, e);
            error_response(&e)
        }
    }
}

/// 计算并渲染接口: Bill -> 可下载的结算单 PDF
pub async fn split_pdf(Json(bill): Json<Bill>) -> Response {
    info!(
        "结算单请求: session={}, {} 个商品",
        bill.session_id,
        bill.items.len()
    );

    // 1. 先把混进商品列表的哨兵行提取进附加字段
    let bill = match service::extract_sentinels(bill) {
        Ok(b) => b,
        Err(e) => {
            error!("Sentinel extraction failed: {}", e);
            return error_response(&e);
        }
    };

    // 2. 分账
    let results = match service::allocate(&bill) {
        Ok(r) => r,
        Err(e) => {
            error!("Split failed for session {}: {}", bill.session_id, e);
            return error_response(&e);
        }
    };

    // 3. 渲染并以附件形式返回
    match pdf::render_settlement(&bill, &results) {
        Ok(bytes) => {
            let filename = format!("split_summary_{}.pdf", bill.session_id);
            info!("结算单生成完成: {} ({} bytes)", filename, bytes.len());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            error!("Render failed for session {}: {}", bill.session_id, e);
            error_response(&e)
        }
    }
}

/// 上传解析接口: multipart 的 file 字段 -> 小票结构化数据
pub async fn upload_parse(mut multipart: Multipart) -> Response {
    let mut file_bytes = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("file") {
                    match field.bytes().await {
                        Ok(bytes) => {
                            file_bytes = Some(bytes);
                            break;
                        }
                        Err(e) => {
                            return error_response(&SplitError::Extraction(format!(
                                "failed to read upload: {e}"
                            )));
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return error_response(&SplitError::Extraction(format!(
                    "malformed multipart body: {e}"
                )));
            }
        }
    }

    let Some(bytes) = file_bytes else {
        return error_response(&SplitError::Validation(
            "missing 'file' field in upload".to_string(),
        ));
    };

    info!("收到上传小票: {} bytes", bytes.len());
    match pdf::extract_receipt(&bytes) {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(e) => {
            error!("Receipt extraction failed: {}", e);
            error_response(&e)
        }
    }
}
