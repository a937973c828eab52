use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub mod protocol;
pub mod route;
pub mod table;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const BEARER_PREFIX: &str = "Bearer ";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 库存变动方向
///
/// 后端计算余额时 `ADJUST` 按入库数量计算。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    #[default]
    In,
    Out,
    Adjust,
}

impl MovementType {
    pub const ALL: [MovementType; 3] = [MovementType::In, MovementType::Out, MovementType::Adjust];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Adjust => "ADJUST",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Some(MovementType::In),
            "OUT" => Some(MovementType::Out),
            "ADJUST" => Some(MovementType::Adjust),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub auto_discount_enabled: bool,
    #[serde(default)]
    pub default_discount_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// 每包数量，散装时为 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// 选择器使用的精简产品行，附带所属分类的默认折扣
///
/// 由 `/products/min` 返回，按名称排序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_pack_factor")]
    pub pack_factor: f64,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub auto_discount_enabled: bool,
    #[serde(default)]
    pub default_discount_percent: f64,
}

fn default_pack_factor() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: f64,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBalance {
    pub product_id: i64,
    pub sku: String,
    pub name: String,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockStatementLine {
    pub id: i64,
    pub created_at: NaiveDateTime,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: f64,
    pub signed_quantity: f64,
    #[serde(default)]
    pub note: Option<String>,
    pub balance_after: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockStatement {
    pub product_id: i64,
    #[serde(default)]
    pub from_date: Option<NaiveDate>,
    #[serde(default)]
    pub to_date: Option<NaiveDate>,
    pub starting_balance: f64,
    pub ending_balance: f64,
    #[serde(default)]
    pub lines: Vec<StockStatementLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub status: String,
    #[serde(default)]
    pub issued_at: Option<NaiveDate>,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub total_gross: f64,
    #[serde(default)]
    pub total_discount: f64,
    #[serde(default)]
    pub total_net: f64,
}

/// 报价单状态，后端以大写字符串保存
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Approved,
    Rejected,
    Cancelled,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 5] = [
        QuoteStatus::Draft,
        QuoteStatus::Sent,
        QuoteStatus::Approved,
        QuoteStatus::Rejected,
        QuoteStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "DRAFT",
            QuoteStatus::Sent => "SENT",
            QuoteStatus::Approved => "APPROVED",
            QuoteStatus::Rejected => "REJECTED",
            QuoteStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|status| status.as_str() == wanted)
    }
}

/// 报价单明细行
///
/// 产品字段是添加时的快照；金额在每次修改后由后端重新计算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub id: i64,
    pub quote_id: i64,
    pub product_id: i64,
    pub sku_snapshot: String,
    pub name_snapshot: String,
    pub unit_snapshot: String,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub gross_total: f64,
    #[serde(default)]
    pub discount_total: f64,
    #[serde(default)]
    pub net_total: f64,
}

/// `GET /quotes/{id}` 的响应：重新计算过金额的抬头和明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDetail {
    pub quote: Quote,
    #[serde(default)]
    pub items: Vec<QuoteItem>,
}

// =========================================================
// 认证载荷 (Auth Payloads)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub ok: bool,
    pub user: User,
    #[serde(default)]
    pub email_sent: bool,
}

/// 通用确认响应 `{ "ok": true, ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_type_wire_format() {
        let json = serde_json::to_string(&MovementType::Adjust).unwrap();
        assert_eq!(json, "\"ADJUST\"");
        let parsed: MovementType = serde_json::from_str("\"OUT\"").unwrap();
        assert_eq!(parsed, MovementType::Out);
        assert_eq!(MovementType::parse(" in "), Some(MovementType::In));
        assert_eq!(MovementType::parse("sideways"), None);
    }

    #[test]
    fn test_statement_decodes_backend_payload() {
        let body = r#"{
            "product_id": 3,
            "from_date": "2024-01-01",
            "to_date": null,
            "starting_balance": 10.0,
            "ending_balance": 7.0,
            "lines": [{
                "id": 9,
                "created_at": "2024-01-02T10:15:00.123456",
                "type": "OUT",
                "quantity": 3.0,
                "signed_quantity": -3.0,
                "note": null,
                "balance_after": 7.0
            }]
        }"#;
        let statement: StockStatement = serde_json::from_str(body).unwrap();
        assert_eq!(statement.from_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(statement.lines.len(), 1);
        assert_eq!(statement.lines[0].movement_type, MovementType::Out);
        assert_eq!(statement.lines[0].signed_quantity, -3.0);
    }

    #[test]
    fn test_quote_detail_decodes_items() {
        let body = r#"{
            "quote": {
                "id": 4, "customer_name": "ACME", "status": "SENT",
                "issued_at": "2024-05-01", "valid_until": "2024-05-08",
                "total_gross": 20.0, "total_discount": 2.0, "total_net": 18.0
            },
            "items": [{
                "id": 11, "quote_id": 4, "product_id": 2,
                "sku_snapshot": "P-2", "name_snapshot": "Parafuso", "unit_snapshot": "UN",
                "quantity": 2.0, "unit_price": 10.0, "discount_percent": 10.0,
                "gross_total": 20.0, "discount_total": 2.0, "net_total": 18.0
            }]
        }"#;
        let detail: QuoteDetail = serde_json::from_str(body).unwrap();
        assert_eq!(QuoteStatus::parse(&detail.quote.status), Some(QuoteStatus::Sent));
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].name_snapshot, "Parafuso");
        assert_eq!(detail.items[0].net_total, 18.0);
    }

    #[test]
    fn test_quote_status_parse() {
        assert_eq!(QuoteStatus::parse(" approved "), Some(QuoteStatus::Approved));
        assert_eq!(QuoteStatus::parse("archived"), None);
        let json = serde_json::to_string(&QuoteStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }

    #[test]
    fn test_product_summary_defaults() {
        let body = r#"{"id": 1, "sku": "A", "name": "Arruela", "unit": "UN", "price": 0.5}"#;
        let row: ProductSummary = serde_json::from_str(body).unwrap();
        assert_eq!(row.pack_factor, 1.0);
        assert!(!row.auto_discount_enabled);
        assert_eq!(row.category_name, None);
    }

    #[test]
    fn test_token_type_defaults_to_bearer() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(token.token_type, "bearer");
    }
}
