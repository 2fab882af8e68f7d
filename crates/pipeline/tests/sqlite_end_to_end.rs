//! Full pipeline over a small on-disk store and markdown corpus.

use analyst_pipeline::{AgentConfig, HybridAgent};
use analyst_protocol::{Question, Route};
use analyst_sql_store::{SqliteExecutor, DEFAULT_ROW_LIMIT};
use analyst_vector_store::{DocCorpus, TfIdfRetriever};
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const SCHEMA: &str = r#"
CREATE TABLE Categories (CategoryID INTEGER PRIMARY KEY, CategoryName TEXT);
CREATE TABLE Products (ProductID INTEGER PRIMARY KEY, ProductName TEXT, CategoryID INTEGER);
CREATE TABLE Customers (CustomerID TEXT PRIMARY KEY, CompanyName TEXT);
CREATE TABLE Orders (OrderID INTEGER PRIMARY KEY, CustomerID TEXT, OrderDate TEXT);
CREATE TABLE "Order Details" (
    OrderID INTEGER, ProductID INTEGER, UnitPrice REAL, Quantity INTEGER, Discount REAL
);
INSERT INTO Categories VALUES (1, 'Beverages'), (2, 'Condiments');
INSERT INTO Products VALUES (1, 'Chai', 1), (2, 'Aniseed Syrup', 2);
INSERT INTO Customers VALUES ('ALFKI', 'Alfreds Futterkiste'), ('BONAP', 'Bon app''');
INSERT INTO Orders VALUES
    (10248, 'ALFKI', '1997-06-10'),
    (10249, 'BONAP', '1997-06-15'),
    (10250, 'ALFKI', '1996-07-04');
INSERT INTO "Order Details" VALUES
    (10248, 1, 18.0, 10, 0.0),
    (10249, 2, 10.0, 5, 0.0),
    (10249, 1, 18.0, 2, 0.0),
    (10250, 2, 10.0, 100, 0.0);
"#;

const CALENDAR: &str = "# Marketing Calendar (1997)

## Summer Beverages 1997
- Dates: 1997-06-01 to 1997-06-30
- Notes: Focus on Beverages and Condiments.

## Winter Classics 1997
- Dates: 1997-12-01 to 1997-12-31
- Notes: Push Dairy Products and Confections for holiday gifting.
";

const POLICY: &str = "# Returns & Policy

- Perishables (Produce, Seafood, Dairy): 3-7 days.
- Beverages unopened: 14 days; opened: no returns.
- Non-perishables: 30 days.
";

fn fixture() -> (TempDir, HybridAgent) {
    fixture_with(&[("marketing_calendar.md", CALENDAR), ("product_policy.md", POLICY)])
}

/// Campaign chunks override question years, so yearly checks run without the calendar.
fn fixture_with(files: &[(&str, &str)]) -> (TempDir, HybridAgent) {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("northwind.sqlite");
    Connection::open(&db).unwrap().execute_batch(SCHEMA).unwrap();

    let docs = tmp.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    for (name, text) in files {
        std::fs::write(docs.join(name), text).unwrap();
    }

    let agent = build(&db, &docs);
    (tmp, agent)
}

fn build(db: &Path, docs: &Path) -> HybridAgent {
    let executor = SqliteExecutor::open(db, DEFAULT_ROW_LIMIT).unwrap();
    let retriever = TfIdfRetriever::new(DocCorpus::load(docs).unwrap());
    HybridAgent::new(
        Arc::new(retriever),
        Arc::new(executor),
        AgentConfig::default(),
        None,
    )
    .unwrap()
}

#[test]
fn campaign_question_uses_calendar_dates() {
    let (_tmp, agent) = fixture();
    let answer = agent.run(&Question::new(
        "q1",
        "What was the top category by quantity sold during the Summer Beverages campaign?",
        "{category:str, quantity:int}",
    ));

    assert_eq!(answer.trace.route, Route::Hybrid);
    assert_eq!(answer.final_answer, json!({"category": "Beverages", "quantity": 12}));
    assert_eq!(answer.trace.attempts.len(), 1);
    assert!(answer.sql.contains("'1997-06-01' AND '1997-06-30'"));
    assert!(answer
        .citations
        .iter()
        .any(|c| c == "marketing_calendar::chunk1"));
}

#[test]
fn yearly_aggregates() {
    let (_tmp, agent) = fixture_with(&[("product_policy.md", POLICY)]);

    let aov = agent.run(&Question::new("q2", "What was the AOV in 1997?", "float"));
    assert_eq!(aov.final_answer, json!(133.0));

    let margin = agent.run(&Question::new(
        "q3",
        "What was the total gross margin in 1997?",
        "float",
    ));
    assert_eq!(margin.final_answer, json!(79.8));

    let customer = agent.run(&Question::new(
        "q4",
        "Who was the top customer by gross margin in 1997?",
        "{customer:str, margin:float}",
    ));
    assert_eq!(
        customer.final_answer,
        json!({"customer": "Alfreds Futterkiste", "margin": 54.0})
    );
}

#[test]
fn all_time_top_products() {
    let (_tmp, agent) = fixture();
    let answer = agent.run(&Question::new(
        "q5",
        "Top 3 products by total revenue all-time",
        "list[{product:str, revenue:float}]",
    ));
    assert_eq!(
        answer.final_answer,
        json!([
            {"product": "Aniseed Syrup", "revenue": 1050.0},
            {"product": "Chai", "revenue": 216.0}
        ])
    );
    assert_eq!(answer.citations[..2], ["Order Details", "Products"]);
}

#[test]
fn return_policy_from_documents() {
    let (_tmp, agent) = fixture();
    let answer = agent.run(&Question::new(
        "q6",
        "According to the product policy, what is the return window (days) for unopened Beverages?",
        "int",
    ));
    assert_eq!(answer.trace.route, Route::Rag);
    assert_eq!(answer.final_answer, json!(14));
    assert!(answer.citations.iter().any(|c| c == "product_policy::chunk1"));
}

#[test]
fn category_revenue_in_year() {
    let (_tmp, agent) = fixture_with(&[("product_policy.md", POLICY)]);
    let answer = agent.run(&Question::new(
        "q7",
        "Total revenue from the Condiments category in 1996?",
        "float",
    ));
    assert_eq!(answer.final_answer, json!(1000.0));
    assert!(answer.sql.contains("c.CategoryName = 'Condiments'"));
}

#[test]
fn campaign_chunk_overrides_question_year() {
    let (_tmp, agent) = fixture();
    let answer = agent.run(&Question::new(
        "q8",
        "Total revenue from the Condiments category in 1996?",
        "float",
    ));
    assert_eq!(answer.trace.plan.date_source, analyst_protocol::DateSource::Document);
    assert_eq!(answer.final_answer, json!(50.0));
}
