//! Integration tests for comments: length bounds, newest-first listing,
//! like toggling, author-or-admin edits and deletes, and the admin listing.

mod common;

use common::{register, register_admin, start_test_server};
use serde_json::{json, Value};

/// Create a post as `token` and return its id.
async fn create_post(client: &reqwest::Client, base_url: &str, token: &str) -> String {
    let post: Value = client
        .post(format!("{}/api/post/create", base_url))
        .bearer_auth(token)
        .json(&json!({ "title": "Discussion", "content": "Talk below" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    post["_id"].as_str().unwrap().to_string()
}

async fn create_comment(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    body: Value,
) -> reqwest::Response {
    client
        .post(format!("{}/api/comment/create", base_url))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn like(client: &reqwest::Client, base_url: &str, token: &str, comment_id: &str) -> Value {
    let resp = client
        .put(format!("{}/api/comment/likeComment/{}", base_url, comment_id))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_comment_length_bounds() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();
    let (token, user_id) = register(&client, &base_url, "alice").await;
    let post_id = create_post(&client, &base_url, &token).await;

    let resp = create_comment(&client, &base_url, &token, json!({ "content": "", "postId": post_id })).await;
    assert_eq!(resp.status(), 400);

    let too_long = "a".repeat(201);
    let resp = create_comment(&client, &base_url, &token, json!({ "content": too_long, "postId": post_id })).await;
    assert_eq!(resp.status(), 400);

    let longest = "a".repeat(200);
    let resp = create_comment(
        &client,
        &base_url,
        &token,
        json!({ "content": longest, "postId": post_id, "userId": user_id }),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let comment: Value = resp.json().await.unwrap();
    assert_eq!(comment["userId"], user_id);
    assert_eq!(comment["postId"], post_id);
    assert_eq!(comment["likes"], json!([]));
    assert_eq!(comment["numberOfLikes"], 0);

    let resp = create_comment(&client, &base_url, &token, json!({ "content": "hi", "postId": "no-such-post" })).await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_comment_as_someone_else_is_forbidden() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();
    let (alice, alice_id) = register(&client, &base_url, "alice").await;
    let (mallory, _) = register(&client, &base_url, "mallory").await;
    let post_id = create_post(&client, &base_url, &alice).await;

    let resp = create_comment(
        &client,
        &base_url,
        &mallory,
        json!({ "content": "pretending", "postId": post_id, "userId": alice_id }),
    )
    .await;
    assert_eq!(resp.status(), 403);

    let resp = client
        .post(format!("{}/api/comment/create", base_url))
        .json(&json!({ "content": "anonymous", "postId": post_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_post_comments_are_newest_first() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();
    let (token, _) = register(&client, &base_url, "alice").await;
    let post_id = create_post(&client, &base_url, &token).await;

    for content in ["first", "second", "third"] {
        let resp = create_comment(&client, &base_url, &token, json!({ "content": content, "postId": post_id })).await;
        assert_eq!(resp.status(), 201);
    }

    // Readable without a session
    let comments: Value = client
        .get(format!("{}/api/comment/getPostComments/{}", base_url, post_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let contents: Vec<_> = comments
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, ["third", "second", "first"]);
}

#[tokio::test]
async fn test_like_toggles_per_user() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();
    let (alice, alice_id) = register(&client, &base_url, "alice").await;
    let (bob, bob_id) = register(&client, &base_url, "bob").await;
    let post_id = create_post(&client, &base_url, &alice).await;

    let comment: Value = create_comment(&client, &base_url, &alice, json!({ "content": "like me", "postId": post_id }))
        .await
        .json()
        .await
        .unwrap();
    let comment_id = comment["_id"].as_str().unwrap();

    let liked = like(&client, &base_url, &alice, comment_id).await;
    assert_eq!(liked["numberOfLikes"], 1);
    assert_eq!(liked["likes"], json!([alice_id]));

    let liked = like(&client, &base_url, &bob, comment_id).await;
    assert_eq!(liked["numberOfLikes"], 2);
    let likes = liked["likes"].as_array().unwrap();
    assert!(likes.contains(&json!(alice_id)));
    assert!(likes.contains(&json!(bob_id)));

    // A second like from the same user takes it back
    let unliked = like(&client, &base_url, &alice, comment_id).await;
    assert_eq!(unliked["numberOfLikes"], 1);
    assert_eq!(unliked["likes"], json!([bob_id]));

    let resp = client
        .put(format!("{}/api/comment/likeComment/missing", base_url))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .put(format!("{}/api/comment/likeComment/{}", base_url, comment_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_edit_and_delete_require_author_or_admin() {
    let (base_url, setup_token) = start_test_server().await;
    let client = reqwest::Client::new();
    let (admin, _) = register_admin(&client, &base_url, &setup_token).await;
    let (alice, _) = register(&client, &base_url, "alice").await;
    let (mallory, _) = register(&client, &base_url, "mallory").await;
    let post_id = create_post(&client, &base_url, &alice).await;

    let comment: Value = create_comment(&client, &base_url, &alice, json!({ "content": "original", "postId": post_id }))
        .await
        .json()
        .await
        .unwrap();
    let comment_id = comment["_id"].as_str().unwrap();

    let resp = client
        .put(format!("{}/api/comment/editComment/{}", base_url, comment_id))
        .bearer_auth(&mallory)
        .json(&json!({ "content": "defaced" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = client
        .delete(format!("{}/api/comment/deleteComment/{}", base_url, comment_id))
        .bearer_auth(&mallory)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let comments: Value = client
        .get(format!("{}/api/comment/getPostComments/{}", base_url, post_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(comments[0]["content"], "original");

    let resp = client
        .put(format!("{}/api/comment/editComment/{}", base_url, comment_id))
        .bearer_auth(&alice)
        .json(&json!({ "content": "edited" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let edited: Value = resp.json().await.unwrap();
    assert_eq!(edited["content"], "edited");

    let resp = client
        .put(format!("{}/api/comment/editComment/{}", base_url, comment_id))
        .bearer_auth(&alice)
        .json(&json!({ "content": "b".repeat(201) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .delete(format!("{}/api/comment/deleteComment/{}", base_url, comment_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Comment has been deleted");

    let resp = client
        .delete(format!("{}/api/comment/deleteComment/{}", base_url, comment_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_admin_lists_all_comments() {
    let (base_url, setup_token) = start_test_server().await;
    let client = reqwest::Client::new();
    let (admin, _) = register_admin(&client, &base_url, &setup_token).await;
    let (alice, _) = register(&client, &base_url, "alice").await;
    let first_post = create_post(&client, &base_url, &alice).await;
    let second_post = create_post(&client, &base_url, &alice).await;

    for (post_id, content) in [(&first_post, "one"), (&second_post, "two"), (&second_post, "three")] {
        create_comment(&client, &base_url, &alice, json!({ "content": content, "postId": post_id })).await;
    }

    let resp = client
        .get(format!("{}/api/comment/getComments", base_url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let page: Value = client
        .get(format!("{}/api/comment/getComments?limit=2", base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["totalComments"], 3);
    assert_eq!(page["lastMonthComments"], 3);
    let comments = page["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], "three");

    let page: Value = client
        .get(format!("{}/api/comment/getComments?order=asc", base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["comments"][0]["content"], "one");
}

#[tokio::test]
async fn test_concurrent_likes_are_not_lost() {
    const LIKERS: usize = 8;

    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();
    let (author, _) = register(&client, &base_url, "author").await;
    let post_id = create_post(&client, &base_url, &author).await;
    let comment: Value = create_comment(&client, &base_url, &author, json!({ "content": "popular", "postId": post_id }))
        .await
        .json()
        .await
        .unwrap();
    let comment_id = comment["_id"].as_str().unwrap().to_string();

    let mut likers = Vec::new();
    for i in 0..LIKERS {
        likers.push(register(&client, &base_url, &format!("fan{}", i)).await);
    }

    let tasks: Vec<_> = likers
        .iter()
        .map(|(token, _)| {
            let client = client.clone();
            let base_url = base_url.clone();
            let token = token.clone();
            let comment_id = comment_id.clone();
            tokio::spawn(async move { like(&client, &base_url, &token, &comment_id).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let comments: Value = client
        .get(format!("{}/api/comment/getPostComments/{}", base_url, post_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let liked = &comments[0];
    assert_eq!(liked["numberOfLikes"], LIKERS);

    let mut likes: Vec<String> = liked["likes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap().to_string())
        .collect();
    likes.sort();
    likes.dedup();
    assert_eq!(likes.len(), LIKERS);
    for (_, user_id) in &likers {
        assert!(likes.contains(user_id));
    }
}
