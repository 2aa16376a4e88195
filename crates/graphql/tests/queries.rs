//! End-to-end queries against the in-memory store and the rewrite router.

use std::sync::{Arc, Mutex};

use async_graphql::{Request, Variables};
use serde_json::{json, Value};
use url::Url;

use folio_core::models::{PostTypeObject, SiteConfig, TaxonomyObject};
use folio_core::ports::{RequestContext, RequestHook};
use folio_core::services::{ConnectionResolver, NodeResolver};
use folio_graphql::{build_schema, FolioSchema};
use folio_routing::RewriteRouter;
use folio_storage::MemoryStore;

const FIXTURE: &str = r#"{
    "users": [{"id": 1, "nicename": "admin", "display_name": "Admin"}],
    "terms": [
        {"id": 10, "taxonomy": "category", "name": "News", "slug": "news"},
        {"id": 20, "taxonomy": "by_uri_tax", "name": "Custom Term", "slug": "custom-term"}
    ],
    "posts": [
        {"id": 1, "slug": "hello", "title": "Hello", "date": "2024-05-03T10:00:00Z",
         "author": 1, "terms": [10]},
        {"id": 2, "post_type": "page", "slug": "about", "date": "2024-01-01T00:00:00Z"},
        {"id": 3, "post_type": "by_uri_cpt", "slug": "my-cpt", "date": "2024-01-02T00:00:00Z",
         "terms": [20]},
        {"id": 4, "post_type": "test_hierarchical", "slug": "parent", "date": "2024-01-03T00:00:00Z"},
        {"id": 5, "post_type": "test_hierarchical", "slug": "child", "parent": 4,
         "date": "2024-01-04T00:00:00Z"},
        {"id": 6, "post_type": "test_hierarchical", "slug": "child-2", "parent": 4,
         "date": "2024-01-05T00:00:00Z"},
        {"id": 7, "post_type": "attachment", "status": "inherit", "slug": "photo",
         "date": "2024-01-06T00:00:00Z",
         "source_url": "http://localhost/wp-content/uploads/photo.jpg"},
        {"id": 8, "post_type": "page", "slug": "home", "date": "2024-01-07T00:00:00Z"}
    ],
    "comments": [
        {"id": 1, "post_id": 1, "content": "c1", "date": "2024-05-04T01:00:00Z"},
        {"id": 2, "post_id": 1, "content": "c2", "date": "2024-05-04T02:00:00Z"},
        {"id": 3, "post_id": 1, "content": "c3", "date": "2024-05-04T03:00:00Z"},
        {"id": 4, "post_id": 1, "content": "c4", "date": "2024-05-04T04:00:00Z"},
        {"id": 5, "post_id": 1, "content": "c5", "date": "2024-05-04T05:00:00Z"},
        {"id": 6, "post_id": 1, "content": "c6", "date": "2024-05-04T06:00:00Z"}
    ]
}"#;

#[derive(Default)]
struct RecordingHook {
    seen: Mutex<Vec<RequestContext>>,
}

impl RequestHook for RecordingHook {
    fn on_parse_request(&self, context: &RequestContext) {
        self.seen.lock().unwrap().push(context.clone());
    }
}

fn site() -> SiteConfig {
    let mut site = SiteConfig::new(Url::parse("http://localhost").unwrap())
        .with_permalinks("/%year%/%monthnum%/%day%/%postname%/");
    site.register_post_type(PostTypeObject::new("by_uri_cpt", "CustomType", "CustomTypes"));
    site.register_post_type(
        PostTypeObject::new("test_hierarchical", "testHierarchical", "testHierarchicals")
            .hierarchical()
            .with_archive(),
    );
    site.register_taxonomy(
        TaxonomyObject::new("by_uri_tax", "CustomTax", "CustomTaxes").for_types(&["by_uri_cpt"]),
    );
    site
}

fn schema_with(fixture: &str, hook: Arc<RecordingHook>) -> FolioSchema {
    let site = Arc::new(site());
    let store = Arc::new(MemoryStore::from_json(site.clone(), fixture).unwrap());
    let router = Arc::new(RewriteRouter::new(&site).unwrap());
    let resolver = NodeResolver::new(site, store.clone(), router).with_hook(hook);
    build_schema(store, resolver, ConnectionResolver::default())
}

fn schema() -> FolioSchema {
    schema_with(FIXTURE, Arc::new(RecordingHook::default()))
}

async fn run(schema: &FolioSchema, query: &str, variables: Value) -> Value {
    let request = Request::new(query).variables(Variables::from_json(variables));
    serde_json::to_value(schema.execute(request).await).unwrap()
}

fn ids(connection: &Value) -> Vec<i64> {
    connection["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["databaseId"].as_i64().unwrap())
        .collect()
}

const COMMENTS: &str = r#"
    query ($first: Int, $last: Int, $after: String, $before: String) {
      comments(first: $first, last: $last, after: $after, before: $before) {
        edges { cursor node { databaseId } }
        nodes { databaseId content }
        pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
      }
    }
"#;

const NODE_BY_URI: &str = r#"
    query ($uri: String!) {
      nodeByUri(uri: $uri) {
        __typename
        ... on ContentNode { databaseId typeName uri isFrontPage isPostsPage }
        ... on TermNode { databaseId typeName uri }
        ... on ContentType { name uri isFrontPage isPostsPage }
        ... on User { databaseId uri }
      }
    }
"#;

// -----------------------------------------------------------------------------
// Connections
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_comments_forward_pagination() {
    let schema = schema();

    let page = run(&schema, COMMENTS, json!({ "first": 2 })).await;
    let comments = &page["data"]["comments"];
    assert_eq!(ids(comments), vec![6, 5]);
    assert_eq!(comments["pageInfo"]["hasNextPage"], json!(true));
    assert_eq!(comments["pageInfo"]["hasPreviousPage"], json!(false));

    let end = comments["pageInfo"]["endCursor"].clone();
    let page = run(&schema, COMMENTS, json!({ "first": 2, "after": end })).await;
    let comments = &page["data"]["comments"];
    assert_eq!(ids(comments), vec![4, 3]);
    assert_eq!(comments["pageInfo"]["hasNextPage"], json!(true));
    assert_eq!(comments["pageInfo"]["hasPreviousPage"], json!(true));
}

#[tokio::test]
async fn test_comments_backward_pagination_keeps_natural_order() {
    let schema = schema();

    let page = run(&schema, COMMENTS, json!({ "last": 2 })).await;
    let comments = &page["data"]["comments"];
    assert_eq!(ids(comments), vec![2, 1]);
    assert_eq!(comments["pageInfo"]["hasPreviousPage"], json!(true));
    assert_eq!(comments["pageInfo"]["hasNextPage"], json!(false));

    let start = comments["pageInfo"]["startCursor"].clone();
    let page = run(&schema, COMMENTS, json!({ "last": 2, "before": start })).await;
    let comments = &page["data"]["comments"];
    assert_eq!(ids(comments), vec![4, 3]);
    assert_eq!(comments["pageInfo"]["hasNextPage"], json!(true));
    assert_eq!(comments["pageInfo"]["hasPreviousPage"], json!(true));
}

#[tokio::test]
async fn test_comments_first_and_last_is_rejected() {
    let response = run(&schema(), COMMENTS, json!({ "first": 1, "last": 1 })).await;
    assert_eq!(response["data"], Value::Null);
    assert_eq!(response["errors"][0]["extensions"]["code"], json!("BAD_USER_INPUT"));
}

#[tokio::test]
async fn test_comments_empty_cursor_is_ignored() {
    let page = run(&schema(), COMMENTS, json!({ "first": 3, "after": "" })).await;
    assert!(page.get("errors").is_none());
    assert_eq!(ids(&page["data"]["comments"]), vec![6, 5, 4]);
}

#[tokio::test]
async fn test_cursor_of_another_connection_is_rejected() {
    let schema = schema();
    let roles = run(&schema, "{ userRoles(first: 1) { pageInfo { endCursor } } }", json!({})).await;
    let role_cursor = roles["data"]["userRoles"]["pageInfo"]["endCursor"].clone();

    let response = run(&schema, COMMENTS, json!({ "first": 2, "after": role_cursor })).await;
    assert_eq!(response["data"], Value::Null);
    let message = response["errors"][0]["message"].as_str().unwrap();
    assert!(message.contains("after"));
}

#[tokio::test]
async fn test_comments_where_filters() {
    let query = r#"
        { comments(where: { contentId: 99 }) { nodes { databaseId } } }
    "#;
    let page = run(&schema(), query, json!({})).await;
    assert_eq!(ids(&page["data"]["comments"]), Vec::<i64>::new());
}

#[tokio::test]
async fn test_user_roles_pagination() {
    let query = r#"
        query ($after: String) {
          userRoles(first: 2, after: $after) {
            nodes { name displayName }
            pageInfo { hasNextPage hasPreviousPage endCursor }
          }
        }
    "#;
    let schema = schema();

    let page = run(&schema, query, json!({})).await;
    let roles = &page["data"]["userRoles"];
    assert_eq!(roles["nodes"][0]["name"], json!("administrator"));
    assert_eq!(roles["nodes"][1]["name"], json!("editor"));
    assert_eq!(roles["pageInfo"]["hasNextPage"], json!(true));

    let end = roles["pageInfo"]["endCursor"].clone();
    let page = run(&schema, query, json!({ "after": end })).await;
    let roles = &page["data"]["userRoles"];
    assert_eq!(roles["nodes"][0]["name"], json!("author"));
    assert_eq!(roles["nodes"][1]["name"], json!("contributor"));
    assert_eq!(roles["pageInfo"]["hasPreviousPage"], json!(true));
}

#[tokio::test]
async fn test_content_nodes_by_type() {
    let query = r#"
        query ($postType: String!) {
          contentNodes(postType: $postType, first: 5) { nodes { databaseId uri } }
        }
    "#;
    let schema = schema();

    let page = run(&schema, query, json!({ "postType": "test_hierarchical" })).await;
    assert_eq!(ids(&page["data"]["contentNodes"]), vec![6, 5, 4]);

    let response = run(&schema, query, json!({ "postType": "nope" })).await;
    assert_eq!(response["errors"][0]["extensions"]["code"], json!("BAD_USER_INPUT"));
}

// -----------------------------------------------------------------------------
// nodeByUri
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_node_by_uri_root_is_posts_listing() {
    let response = run(&schema(), NODE_BY_URI, json!({ "uri": "/" })).await;
    let node = &response["data"]["nodeByUri"];
    assert_eq!(node["__typename"], json!("ContentType"));
    assert_eq!(node["name"], json!("post"));
    assert_eq!(node["isFrontPage"], json!(true));
    assert_eq!(node["isPostsPage"], json!(true));
}

#[tokio::test]
async fn test_node_by_uri_post_and_page() {
    let schema = schema();

    let response = run(&schema, NODE_BY_URI, json!({ "uri": "/2024/05/03/hello/" })).await;
    let node = &response["data"]["nodeByUri"];
    assert_eq!(node["databaseId"], json!(1));
    assert_eq!(node["typeName"], json!("Post"));

    let response = run(&schema, NODE_BY_URI, json!({ "uri": "http://localhost/about" })).await;
    let node = &response["data"]["nodeByUri"];
    assert_eq!(node["databaseId"], json!(2));
    assert_eq!(node["uri"], json!("/about/"));
}

#[tokio::test]
async fn test_node_by_uri_custom_types_and_taxonomies() {
    let schema = schema();

    let response = run(&schema, NODE_BY_URI, json!({ "uri": "/by_uri_cpt/my-cpt/" })).await;
    assert_eq!(response["data"]["nodeByUri"]["typeName"], json!("CustomType"));

    let response = run(&schema, NODE_BY_URI, json!({ "uri": "/by_uri_tax/custom-term/" })).await;
    let node = &response["data"]["nodeByUri"];
    assert_eq!(node["__typename"], json!("TermNode"));
    assert_eq!(node["typeName"], json!("CustomTax"));

    let response = run(&schema, NODE_BY_URI, json!({ "uri": "/category/news/" })).await;
    assert_eq!(response["data"]["nodeByUri"]["databaseId"], json!(10));

    let response = run(&schema, NODE_BY_URI, json!({ "uri": "/author/admin/" })).await;
    assert_eq!(response["data"]["nodeByUri"]["__typename"], json!("User"));

    let response = run(&schema, NODE_BY_URI, json!({ "uri": "/test_hierarchical/" })).await;
    assert_eq!(response["data"]["nodeByUri"]["name"], json!("test_hierarchical"));
}

#[tokio::test]
async fn test_node_by_uri_hierarchical_requires_exact_path() {
    let schema = schema();

    let uri = "/test_hierarchical/parent/child/";
    let response = run(&schema, NODE_BY_URI, json!({ "uri": uri })).await;
    let node = &response["data"]["nodeByUri"];
    assert_eq!(node["databaseId"], json!(5));
    assert_eq!(node["typeName"], json!("TestHierarchical"));
    assert_eq!(node["uri"], json!(uri));

    let response = run(
        &schema,
        NODE_BY_URI,
        json!({ "uri": "/test_hierarchical/parent/child-2/" }),
    )
    .await;
    assert_eq!(response["data"]["nodeByUri"]["databaseId"], json!(6));

    // Test critique: un chemin partiel ne renvoie rien
    let response = run(&schema, NODE_BY_URI, json!({ "uri": "/test_hierarchical/child/" })).await;
    assert_eq!(response["data"]["nodeByUri"], Value::Null);
}

#[tokio::test]
async fn test_node_by_uri_wrong_date_is_null() {
    let schema = schema();

    // Le slug existe, mais l'article n'est pas publié à cette date
    let response = run(&schema, NODE_BY_URI, json!({ "uri": "/1999/01/01/hello/" })).await;
    assert!(response.get("errors").is_none());
    assert_eq!(response["data"]["nodeByUri"], Value::Null);

    let response = run(&schema, NODE_BY_URI, json!({ "uri": "/2024/05/03/hello/" })).await;
    assert_eq!(response["data"]["nodeByUri"]["uri"], json!("/2024/05/03/hello/"));
}

#[tokio::test]
async fn test_node_by_uri_external_is_null() {
    let response = run(
        &schema(),
        NODE_BY_URI,
        json!({ "uri": "https://external-domain.com/about" }),
    )
    .await;
    assert!(response.get("errors").is_none());
    assert_eq!(response["data"]["nodeByUri"], Value::Null);
}

#[tokio::test]
async fn test_node_by_uri_fires_parse_request_hook() {
    let hook = Arc::new(RecordingHook::default());
    let schema = schema_with(FIXTURE, hook.clone());

    run(&schema, NODE_BY_URI, json!({ "uri": "/about" })).await;

    let seen = hook.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].request, "about");
    assert_eq!(
        seen[0].query_vars.get("pagename").map(String::as_str),
        Some("about")
    );
}

// -----------------------------------------------------------------------------
// page / mediaItem
// -----------------------------------------------------------------------------

const FRONT_PAGE: &str = r#"
    { page(id: "/", idType: URI) { databaseId isFrontPage uri } }
"#;

#[tokio::test]
async fn test_page_by_uri_root_depends_on_front_page_setting() {
    let response = run(&schema(), FRONT_PAGE, json!({})).await;
    assert!(response.get("errors").is_none());
    assert_eq!(response["data"]["page"], Value::Null);

    let mut fixture: Value = serde_json::from_str(FIXTURE).unwrap();
    fixture["reading"] = json!({ "show_on_front": "page", "page_on_front": 8 });
    let schema = schema_with(&fixture.to_string(), Arc::new(RecordingHook::default()));

    let response = run(&schema, FRONT_PAGE, json!({})).await;
    let page = &response["data"]["page"];
    assert_eq!(page["databaseId"], json!(8));
    assert_eq!(page["isFrontPage"], json!(true));
    assert_eq!(page["uri"], json!("/"));
}

#[tokio::test]
async fn test_page_by_database_id() {
    let query = r#"{ page(id: "2", idType: DATABASE_ID) { databaseId uri } }"#;
    let response = run(&schema(), query, json!({})).await;
    assert_eq!(response["data"]["page"]["uri"], json!("/about/"));

    // Un article n'est pas une page
    let query = r#"{ page(id: "1", idType: DATABASE_ID) { databaseId } }"#;
    let response = run(&schema(), query, json!({})).await;
    assert_eq!(response["data"]["page"], Value::Null);
}

#[tokio::test]
async fn test_media_item_lookups() {
    let query = r#"
        query ($id: ID!, $idType: MediaItemIdType!) {
          mediaItem(id: $id, idType: $idType) { databaseId sourceUrl uri }
        }
    "#;
    let schema = schema();

    let response = run(
        &schema,
        query,
        json!({ "id": "http://localhost/wp-content/uploads/photo.jpg", "idType": "SOURCE_URL" }),
    )
    .await;
    let media = &response["data"]["mediaItem"];
    assert_eq!(media["databaseId"], json!(7));

    let uri = media["uri"].clone();
    let response = run(&schema, query, json!({ "id": uri, "idType": "URI" })).await;
    assert_eq!(response["data"]["mediaItem"]["databaseId"], json!(7));

    for id_type in ["URI", "SOURCE_URL"] {
        let response = run(
            &schema,
            query,
            json!({ "id": "https://external-domain.com/wp-content/uploads/photo.jpg", "idType": id_type }),
        )
        .await;
        assert!(response.get("errors").is_none());
        assert_eq!(response["data"]["mediaItem"], Value::Null);
    }
}
