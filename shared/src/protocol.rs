use crate::{
    Category, OkResponse, Product, ProductSummary, Quote, QuoteDetail, QuoteItem, QuoteStatus,
    RegisterResponse, StockBalance, StockMovement, StockStatement, TokenResponse, User,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// API 请求的 HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// 该方法是否发送 JSON 请求体
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// 定义 API 端点的请求/响应关系及元数据
pub trait ApiRequest: Serialize {
    /// 响应类型
    type Response: DeserializeOwned;
    /// 相对 API 地址的路径
    const PATH: &'static str;
    /// HTTP 方法
    const METHOD: HttpMethod;

    /// 完整路径（含查询串和路径参数），多数端点直接使用 `PATH`
    fn path(&self) -> String {
        Self::PATH.to_string()
    }
}

// =========================================================
// 服务 (Service)
// =========================================================

/// 存活检查
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthRequest;

impl ApiRequest for HealthRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "/health";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// 列出后端暴露的路径
#[derive(Debug, Serialize, Deserialize)]
pub struct ListRoutesRequest;

impl ApiRequest for ListRoutesRequest {
    type Response = Vec<String>;
    const PATH: &'static str = "/debug/routes";
    const METHOD: HttpMethod = HttpMethod::Get;
}

// =========================================================
// 认证 (Auth)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for RegisterRequest {
    type Response = RegisterResponse;
    const PATH: &'static str = "/auth/register";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = TokenResponse;
    const PATH: &'static str = "/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeRequest;

impl ApiRequest for MeRequest {
    type Response = User;
    const PATH: &'static str = "/auth/me";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// 在服务端吊销当前令牌
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutRequest;

impl ApiRequest for LogoutRequest {
    type Response = OkResponse;
    const PATH: &'static str = "/auth/logout";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl ApiRequest for ForgotPasswordRequest {
    type Response = OkResponse;
    const PATH: &'static str = "/auth/forgot-password";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    /// 邮件发送的 6 位验证码
    pub token: String,
    pub new_password: String,
}

impl ApiRequest for ResetPasswordRequest {
    type Response = OkResponse;
    const PATH: &'static str = "/auth/reset-password";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// 目录 (Catalog)
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ListProductsRequest;

impl ApiRequest for ListProductsRequest {
    type Response = Vec<Product>;
    const PATH: &'static str = "/products";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_factor: Option<f64>,
}

impl ApiRequest for CreateProductRequest {
    type Response = Product;
    const PATH: &'static str = "/products";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// 部分更新：缺省字段保持不变
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    /// 路径参数，不进入请求体
    #[serde(skip)]
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

impl ApiRequest for UpdateProductRequest {
    type Response = Product;
    const PATH: &'static str = "/products";
    const METHOD: HttpMethod = HttpMethod::Patch;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.id)
    }
}

/// 带分类默认折扣的产品选择列表
#[derive(Debug, Serialize, Deserialize)]
pub struct ListProductSummariesRequest;

impl ApiRequest for ListProductSummariesRequest {
    type Response = Vec<ProductSummary>;
    const PATH: &'static str = "/products/min";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListCategoriesRequest;

impl ApiRequest for ListCategoriesRequest {
    type Response = Vec<Category>;
    const PATH: &'static str = "/categories";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub auto_discount_enabled: bool,
    #[serde(default)]
    pub default_discount_percent: f64,
}

impl ApiRequest for CreateCategoryRequest {
    type Response = Category;
    const PATH: &'static str = "/categories";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_discount_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_discount_percent: Option<f64>,
}

impl ApiRequest for UpdateCategoryRequest {
    type Response = Category;
    const PATH: &'static str = "/categories";
    const METHOD: HttpMethod = HttpMethod::Patch;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.id)
    }
}

// =========================================================
// 库存 (Stock)
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMovementsRequest;

impl ApiRequest for ListMovementsRequest {
    type Response = Vec<StockMovement>;
    const PATH: &'static str = "/stock/movements";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMovementRequest {
    pub product_id: i64,
    #[serde(rename = "type")]
    pub movement_type: crate::MovementType,
    pub quantity: f64,
    pub note: Option<String>,
}

impl ApiRequest for CreateMovementRequest {
    type Response = StockMovement;
    const PATH: &'static str = "/stock/movements";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StockBalanceRequest;

impl ApiRequest for StockBalanceRequest {
    type Response = Vec<StockBalance>;
    const PATH: &'static str = "/stock/balance";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// 单个产品的库存流水，起止日期可选且包含边界
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementRequest {
    pub product_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
}

impl ApiRequest for StatementRequest {
    type Response = StockStatement;
    const PATH: &'static str = "/stock/statement";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        // 整数和日期组成的扁平结构编码不会失败
        match serde_urlencoded::to_string(self) {
            Ok(query) if !query.is_empty() => format!("{}?{}", Self::PATH, query),
            _ => format!("{}?product_id={}", Self::PATH, self.product_id),
        }
    }
}

// =========================================================
// 报价 (Quotes)
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ListQuotesRequest;

impl ApiRequest for ListQuotesRequest {
    type Response = Vec<Quote>;
    const PATH: &'static str = "/quotes";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuoteRequest {
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub valid_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ApiRequest for CreateQuoteRequest {
    type Response = Quote;
    const PATH: &'static str = "/quotes";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// 报价单抬头与明细，每次读取都会重新计算金额
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetQuoteRequest {
    #[serde(skip)]
    pub id: i64,
}

impl ApiRequest for GetQuoteRequest {
    type Response = QuoteDetail;
    const PATH: &'static str = "/quotes";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQuoteStatusRequest {
    #[serde(skip)]
    pub id: i64,
    pub status: QuoteStatus,
}

impl ApiRequest for UpdateQuoteStatusRequest {
    type Response = Quote;
    const PATH: &'static str = "/quotes";
    const METHOD: HttpMethod = HttpMethod::Patch;

    fn path(&self) -> String {
        format!("{}/{}/status", Self::PATH, self.id)
    }
}

/// 添加明细行
///
/// 未给单价时使用产品价格；未给折扣时，若分类启用了自动折扣则使用分类默认值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddQuoteItemRequest {
    #[serde(skip)]
    pub quote_id: i64,
    pub product_id: i64,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
}

impl ApiRequest for AddQuoteItemRequest {
    type Response = QuoteItem;
    const PATH: &'static str = "/quotes";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/{}/items", Self::PATH, self.quote_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateQuoteItemRequest {
    #[serde(skip)]
    pub quote_id: i64,
    #[serde(skip)]
    pub item_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
}

impl ApiRequest for UpdateQuoteItemRequest {
    type Response = QuoteItem;
    const PATH: &'static str = "/quotes";
    const METHOD: HttpMethod = HttpMethod::Patch;

    fn path(&self) -> String {
        format!("{}/{}/items/{}", Self::PATH, self.quote_id, self.item_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteQuoteItemRequest {
    #[serde(skip)]
    pub quote_id: i64,
    #[serde(skip)]
    pub item_id: i64,
}

impl ApiRequest for DeleteQuoteItemRequest {
    type Response = OkResponse;
    const PATH: &'static str = "/quotes";
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("{}/{}/items/{}", Self::PATH, self.quote_id, self.item_id)
    }
}
