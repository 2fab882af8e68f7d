//! Fixed query text per intent.
//!
//! Revenue is `UnitPrice * Quantity * (1 - Discount)`; cost is approximated as 70% of
//! `UnitPrice`, so margin is the remaining 30% of each line's discounted revenue.

use analyst_protocol::{Intent, Plan};

/// Tables the templates may reference.
pub const KNOWN_TABLES: &[&str] = &["Orders", "Order Details", "Products", "Customers", "Categories"];

/// Query text for `plan.intent`, or an empty string when the intent has no template or a
/// required constraint is missing.
#[must_use]
pub fn render(plan: &Plan) -> String {
    let dates = plan.dates.as_ref();
    match plan.intent {
        Intent::TopCategoryByQuantity => dates.map_or_else(String::new, |d| {
            format!(
                "SELECT c.CategoryName AS category, SUM(od.Quantity) AS quantity \
                 FROM \"Order Details\" od \
                 JOIN Orders o ON od.OrderID = o.OrderID \
                 JOIN Products p ON od.ProductID = p.ProductID \
                 JOIN Categories c ON p.CategoryID = c.CategoryID \
                 WHERE o.OrderDate BETWEEN '{}' AND '{}' \
                 GROUP BY c.CategoryName ORDER BY quantity DESC LIMIT 1;",
                d.start, d.end
            )
        }),
        Intent::AverageOrderValue => dates.map_or_else(String::new, |d| {
            format!(
                "SELECT CAST(SUM(od.UnitPrice * od.Quantity * (1 - od.Discount)) AS REAL) \
                 / COUNT(DISTINCT o.OrderID) AS aov \
                 FROM \"Order Details\" od \
                 JOIN Orders o ON od.OrderID = o.OrderID \
                 WHERE o.OrderDate BETWEEN '{}' AND '{}';",
                d.start, d.end
            )
        }),
        Intent::GrossMarginByCustomer => dates.map_or_else(String::new, |d| {
            format!(
                "SELECT c.CompanyName AS customer, \
                 SUM((od.UnitPrice - (od.UnitPrice * 0.7)) * od.Quantity * (1 - od.Discount)) AS margin \
                 FROM \"Order Details\" od \
                 JOIN Orders o ON od.OrderID = o.OrderID \
                 JOIN Customers c ON o.CustomerID = c.CustomerID \
                 WHERE o.OrderDate BETWEEN '{}' AND '{}' \
                 GROUP BY c.CustomerID, c.CompanyName ORDER BY margin DESC LIMIT 1;",
                d.start, d.end
            )
        }),
        Intent::GrossMarginTotal => dates.map_or_else(String::new, |d| {
            format!(
                "SELECT SUM((od.UnitPrice - (od.UnitPrice * 0.7)) * od.Quantity * (1 - od.Discount)) AS margin \
                 FROM \"Order Details\" od \
                 JOIN Orders o ON od.OrderID = o.OrderID \
                 WHERE o.OrderDate BETWEEN '{}' AND '{}';",
                d.start, d.end
            )
        }),
        Intent::TopProductsByRevenue => "SELECT p.ProductName AS product, \
             SUM(od.UnitPrice * od.Quantity * (1 - od.Discount)) AS revenue \
             FROM \"Order Details\" od \
             JOIN Products p ON od.ProductID = p.ProductID \
             GROUP BY p.ProductID, p.ProductName ORDER BY revenue DESC LIMIT 3;"
            .to_string(),
        Intent::CategoryRevenue => match (dates, plan.category.as_deref()) {
            (Some(d), Some(category)) => format!(
                "SELECT SUM(od.UnitPrice * od.Quantity * (1 - od.Discount)) AS revenue \
                 FROM \"Order Details\" od \
                 JOIN Orders o ON od.OrderID = o.OrderID \
                 JOIN Products p ON od.ProductID = p.ProductID \
                 JOIN Categories c ON p.CategoryID = c.CategoryID \
                 WHERE c.CategoryName = '{}' AND o.OrderDate BETWEEN '{}' AND '{}';",
                quote_literal(category),
                d.start,
                d.end
            ),
            _ => String::new(),
        },
        Intent::ReturnPolicy | Intent::Unknown => String::new(),
    }
}

fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}
