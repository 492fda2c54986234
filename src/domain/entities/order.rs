use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Approved,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Approved => "APPROVED",
            OrderStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "APPROVED" => Ok(OrderStatus::Approved),
            "REJECTED" => Ok(OrderStatus::Rejected),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_no: String,
    pub enquiry_id: i64,
    pub salesman_id: Option<i64>,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub invoice_number: Option<String>,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<i64>,
    pub decided_at: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_no: String,
    pub enquiry_id: i64,
    pub salesman_id: Option<i64>,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub notes: Option<String>,
}

/// Money for a line: `(discount_amount, total_amount)`.
pub fn price_line(unit_price: f64, quantity: i64, discount_percent: f64) -> (f64, f64) {
    let gross = unit_price * quantity as f64;
    let discount_amount = gross * discount_percent / 100.0;
    (discount_amount, gross - discount_amount)
}

/// Order numbers look like `ORD20260314A1B2C3`.
pub fn generate_order_no(now: chrono::DateTime<chrono::Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("ORD{}{}", now.format("%Y%m%d"), suffix)
}

/// Invoice numbers are sequential per day: `INV-20260314-0001`.
pub fn invoice_prefix(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("INV-{}-", now.format("%Y%m%d"))
}

pub fn format_invoice_number(prefix: &str, sequence: i64) -> String {
    format!("{}{:04}", prefix, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_line_applies_percentage_discount() {
        let (discount, total) = price_line(12_500.0, 2, 10.0);
        assert!((discount - 2_500.0).abs() < f64::EPSILON);
        assert!((total - 22_500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invoice_number_shape() {
        use chrono::TimeZone;
        let now = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        let prefix = invoice_prefix(now);
        assert_eq!(prefix, "INV-20260314-");
        assert_eq!(format_invoice_number(&prefix, 7), "INV-20260314-0007");
    }

    #[test]
    fn test_price_line_without_discount() {
        let (discount, total) = price_line(999.0, 3, 0.0);
        assert_eq!(discount, 0.0);
        assert!((total - 2_997.0).abs() < f64::EPSILON);
    }
}
