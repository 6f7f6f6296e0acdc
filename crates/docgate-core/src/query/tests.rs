use serde_json::{json, Value as JsonValue};

use super::*;

fn products() -> Vec<StoreItem> {
    [
        json!({"id": "1", "name": "Laptop Pro 15", "category": "Electronics", "price": 1299.99, "inStock": true}),
        json!({"id": "2", "name": "Wireless Mouse", "category": "Electronics", "price": 29.99, "inStock": true}),
        json!({"id": "4", "name": "Office Chair", "category": "Furniture", "price": 299.99, "inStock": true}),
        json!({"id": "5", "name": "Standing Desk", "category": "Furniture", "price": 599.99, "inStock": false}),
        json!({"id": "8", "name": "Desk Lamp", "category": "Lighting", "price": 45.99, "tags": ["led", "desk"]}),
    ]
    .into_iter()
    .map(|v| v.as_object().cloned().unwrap())
    .collect()
}

fn run(sql: &str) -> Vec<JsonValue> {
    let items = products();
    Query::parse(sql).unwrap().execute(items.iter())
}

fn ids(results: &[JsonValue]) -> Vec<&str> {
    results.iter().map(|r| r["id"].as_str().unwrap()).collect()
}

#[test]
fn select_all_preserves_storage_order() {
    let results = run("SELECT * FROM c");
    assert_eq!(ids(&results), vec!["1", "2", "4", "5", "8"]);
}

#[test]
fn where_equality_on_partition_field() {
    let results = run("SELECT * FROM c WHERE c.category = 'Electronics'");
    assert_eq!(ids(&results), vec!["1", "2"]);
}

#[test]
fn keywords_are_case_insensitive() {
    let results = run("select * from c where c.category = \"Furniture\" and c.inStock = true");
    assert_eq!(ids(&results), vec!["4"]);
}

#[test]
fn boolean_logic_and_grouping() {
    let results =
        run("SELECT * FROM c WHERE (c.category = 'Lighting' OR c.price < 50) AND NOT (c.id = '8')");
    assert_eq!(ids(&results), vec!["2"]);
}

#[test]
fn comparison_across_types_is_undefined() {
    // price is a number, so comparing to a string never matches, not even with !=
    let results = run("SELECT * FROM c WHERE c.price != 'cheap'");
    assert!(results.is_empty());

    // missing property is undefined
    let results = run("SELECT * FROM c WHERE c.tags = null");
    assert!(results.is_empty());
}

#[test]
fn functions() {
    let results = run("SELECT * FROM c WHERE LOWER(c.category) = 'electronics'");
    assert_eq!(ids(&results), vec!["1", "2"]);

    let results = run("SELECT * FROM c WHERE CONTAINS(c.name, 'desk', true)");
    assert_eq!(ids(&results), vec!["5", "8"]);

    let results = run("SELECT * FROM c WHERE STARTSWITH(c.name, 'Office')");
    assert_eq!(ids(&results), vec!["4"]);

    let results = run("SELECT * FROM c WHERE IS_DEFINED(c.tags)");
    assert_eq!(ids(&results), vec!["8"]);
}

#[test]
fn projections_and_aliases() {
    let results = run("SELECT c.id, c.name AS title FROM c WHERE c.id = '4'");
    assert_eq!(results, vec![json!({"id": "4", "title": "Office Chair"})]);

    let results = run("SELECT VALUE c.name FROM c WHERE c.category = 'Lighting'");
    assert_eq!(results, vec![json!("Desk Lamp")]);

    let results = run("SELECT VALUE c.tags[1] FROM c WHERE c.id = '8'");
    assert_eq!(results, vec![json!("desk")]);

    let results = run("SELECT c[\"category\"] FROM c WHERE c.id = '1'");
    assert_eq!(results, vec![json!({"category": "Electronics"})]);
}

#[test]
fn count_forms() {
    assert_eq!(run("SELECT VALUE COUNT(1) FROM c"), vec![json!(5)]);
    assert_eq!(
        run("SELECT COUNT(1) FROM c WHERE c.category = 'Furniture'"),
        vec![json!({"$1": 2})]
    );
    assert_eq!(run("SELECT VALUE COUNT(c.tags) FROM c"), vec![json!(1)]);
}

#[test]
fn order_by_and_top() {
    let results = run("SELECT * FROM c ORDER BY c.price DESC");
    assert_eq!(ids(&results), vec!["1", "5", "4", "8", "2"]);

    let results = run("SELECT TOP 2 * FROM c ORDER BY c.price");
    assert_eq!(ids(&results), vec!["2", "8"]);
}

#[test]
fn malformed_queries_are_rejected() {
    assert!(matches!(Query::parse(""), Err(QueryError::EmptyInput)));
    assert!(matches!(
        Query::parse("SELECT * FROM c WHERE"),
        Err(QueryError::UnexpectedToken { expected: "expression", .. })
    ));
    assert!(matches!(
        Query::parse("SELECT * FROM c WHERE d.id = '1'"),
        Err(QueryError::UnknownIdentifier { .. })
    ));
    assert!(matches!(
        Query::parse("SELECT * FROM c WHERE FOO(c.id)"),
        Err(QueryError::UnknownFunction { .. })
    ));
    assert!(matches!(
        Query::parse("SELECT * FROM c WHERE LOWER(c.a, c.b) = 'x'"),
        Err(QueryError::Arity { name: "LOWER", .. })
    ));
    assert!(matches!(
        Query::parse("SELECT * FROM c extra"),
        Err(QueryError::UnexpectedToken { expected: "end of input", .. })
    ));
    assert!(matches!(Query::parse("SELECT c.id, COUNT(1) FROM c"), Err(QueryError::MisplacedCount)));
}

#[test]
fn query_errors_convert_to_store_query_errors() {
    let err: StoreError = Query::parse("SELEC * FROM c").unwrap_err().into();
    match err {
        StoreError::Query(msg) => assert!(msg.contains("SELECT")),
        other => panic!("unexpected error: {other:?}"),
    }
}
