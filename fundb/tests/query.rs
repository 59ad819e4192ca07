use bson::doc;
use fundb::{memory::InMemoryStore, page::encode_cursor, prelude::*};

async fn writer_with_items(n: i64) -> Writer<InMemoryStore> {
    let writer = Writer::builder(InMemoryStore::new())
        .random_source(SeededRandom::new(11))
        .build();

    for i in 0..n {
        let team = if i % 2 == 0 { "red" } else { "blue" };
        writer
            .insert("items", doc! { "n": i, "team": team, "meta": { "rank": 10 - i } })
            .await
            .unwrap();
    }

    writer
}

fn numbers(documents: &[Document]) -> Vec<i64> {
    documents
        .iter()
        .map(|doc| doc.get("n").unwrap().as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn collect_returns_all_in_creation_order() {
    let writer = writer_with_items(4).await;

    let asc = writer.query("items").collect().await.unwrap();
    assert_eq!(numbers(&asc), vec![0, 1, 2, 3]);

    let desc = writer
        .query("items")
        .order(SortOrder::Desc)
        .collect()
        .await
        .unwrap();
    assert_eq!(numbers(&desc), vec![3, 2, 1, 0]);
}

#[tokio::test]
async fn querying_an_unknown_table_is_empty() {
    let writer = writer_with_items(2).await;

    assert!(writer.query("nothing").collect().await.unwrap().is_empty());
    assert!(writer.query("nothing").first().await.unwrap().is_none());
}

#[tokio::test]
async fn filters_are_anded() {
    let writer = writer_with_items(6).await;

    let results = writer
        .query("items")
        .filter(Filter::eq("team", "red"))
        .filter(Filter::gt("n", 0))
        .collect()
        .await
        .unwrap();
    assert_eq!(numbers(&results), vec![2, 4]);

    let results = writer
        .query("items")
        .filter(Filter::or([Filter::lt("n", 1), Filter::gte("n", 5)]))
        .collect()
        .await
        .unwrap();
    assert_eq!(numbers(&results), vec![0, 5]);

    let results = writer
        .query("items")
        .filter(Filter::not(Filter::eq("team", "red")))
        .filter(Filter::lte("meta.rank", 8))
        .collect()
        .await
        .unwrap();
    assert_eq!(numbers(&results), vec![3, 5]);
}

#[tokio::test]
async fn vacuous_combinators() {
    let writer = writer_with_items(3).await;

    let all = writer
        .query("items")
        .filter(Filter::and(Vec::<Expr>::new()))
        .collect()
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let none = writer
        .query("items")
        .filter(Filter::or(Vec::<Expr>::new()))
        .collect()
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn index_range_narrows_results() {
    let writer = writer_with_items(6).await;

    let results = writer
        .query("items")
        .with_index("by_team_and_n", |range| range.eq("team", "blue").gte("n", 2).lt("n", 5))
        .collect()
        .await
        .unwrap();

    assert_eq!(numbers(&results), vec![3]);
}

#[tokio::test]
async fn first_and_take() {
    let writer = writer_with_items(5).await;

    let first = writer.query("items").first().await.unwrap().unwrap();
    assert_eq!(first.get("n").unwrap().as_i64(), Some(0));

    let last = writer
        .query("items")
        .order(SortOrder::Desc)
        .first()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(last.get("n").unwrap().as_i64(), Some(4));

    assert_eq!(numbers(&writer.query("items").take(2).await.unwrap()), vec![0, 1]);
    assert!(writer.query("items").take(0).await.unwrap().is_empty());
    assert_eq!(writer.query("items").take(50).await.unwrap().len(), 5);
}

#[tokio::test]
async fn unique_distinguishes_zero_one_and_many() {
    let writer = writer_with_items(4).await;

    let none = writer
        .query("items")
        .filter(Filter::eq("n", 99))
        .unique()
        .await
        .unwrap();
    assert!(none.is_none());

    let one = writer
        .query("items")
        .filter(Filter::eq("n", 2))
        .unique()
        .await
        .unwrap();
    assert_eq!(one.unwrap().get("n").unwrap().as_i64(), Some(2));

    let err = writer
        .query("items")
        .filter(Filter::eq("team", "red"))
        .unique()
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::MultipleResults(2)));
}

#[tokio::test]
async fn paginate_walks_the_table() {
    let writer = writer_with_items(5).await;

    let first = writer
        .query("items")
        .paginate(PaginationOptions::new(2))
        .await
        .unwrap();
    assert_eq!(numbers(&first.page), vec![0, 1]);
    assert!(!first.is_done);
    assert!(!first.continue_cursor.is_empty());

    let rest = writer
        .query("items")
        .paginate(PaginationOptions::new(3).with_cursor(first.continue_cursor))
        .await
        .unwrap();
    assert_eq!(numbers(&rest.page), vec![2, 3, 4]);
    assert!(rest.is_done);
}

#[tokio::test]
async fn paginate_descending_with_filters() {
    let writer = writer_with_items(7).await;
    let mut cursor = String::new();
    let mut seen = Vec::new();

    loop {
        let page = writer
            .query("items")
            .filter(Filter::eq("team", "red"))
            .order(SortOrder::Desc)
            .paginate(PaginationOptions::new(3).with_cursor(cursor))
            .await
            .unwrap();

        seen.extend(numbers(&page.page));
        if page.is_done {
            break;
        }
        cursor = page.continue_cursor;
    }

    assert_eq!(seen, vec![6, 4, 2, 0]);
}

#[tokio::test]
async fn paginate_empty_table() {
    let writer = writer_with_items(0).await;

    let page = writer
        .query("items")
        .paginate(PaginationOptions::new(10))
        .await
        .unwrap();

    assert!(page.page.is_empty());
    assert!(page.is_done);
    assert_eq!(page.continue_cursor, "");
}

#[tokio::test]
async fn paginate_resumes_after_deleted_cursor_document() {
    let writer = writer_with_items(4).await;

    let first = writer
        .query("items")
        .paginate(PaginationOptions::new(2))
        .await
        .unwrap();
    writer.delete(first.page[1].id()).await.unwrap();

    let rest = writer
        .query("items")
        .paginate(PaginationOptions::new(10).with_cursor(first.continue_cursor))
        .await
        .unwrap();
    assert_eq!(numbers(&rest.page), vec![2, 3]);
}

#[tokio::test]
async fn malformed_cursors_are_rejected() {
    let writer = writer_with_items(2).await;

    let err = writer
        .query("items")
        .paginate(PaginationOptions::new(1).with_cursor("not base64!"))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::InvalidCursor(_)));

    let stranger = DocumentId::parse("items_doesnotexist").unwrap();
    let err = writer
        .query("items")
        .paginate(PaginationOptions::new(1).with_cursor(encode_cursor(&stranger)))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::InvalidCursor(_)));
}

#[tokio::test]
async fn pagination_types_use_client_field_names() {
    let writer = writer_with_items(1).await;

    let options: PaginationOptions =
        serde_json::from_value(serde_json::json!({ "numItems": 5, "cursor": "" })).unwrap();
    let page = writer.query("items").paginate(options).await.unwrap();

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["isDone"], serde_json::json!(true));
    assert!(json["continueCursor"].is_string());
    assert_eq!(json["page"][0]["n"], serde_json::json!(0));
}
