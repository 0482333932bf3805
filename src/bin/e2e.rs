use serde_json::{Value, json};

// Smoke test against a locally running server. Start the server (and a fresh
// DB from create_db) first, then run this binary.
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let port = std::env::var("MATRI_PORT").unwrap_or_else(|_| "3000".to_string());
    let base = format!("http://localhost:{}", port);
    let client = reqwest::Client::new();

    let signup: Value = client
        .post(format!("{}/accounts", base))
        .json(&json!({"email": "e2e@example.com", "name": "E2E Member"}))
        .send()
        .await
        .expect("Failed to sign up")
        .json()
        .await
        .expect("Invalid signup response");
    println!("signup: {}", signup);

    let token_body: Value = client
        .post(format!("{}/jwt", base))
        .json(&json!({"email": "e2e@example.com"}))
        .send()
        .await
        .expect("Failed to issue token")
        .json()
        .await
        .expect("Invalid token response");
    let token = token_body["token"].as_str().expect("No token").to_string();
    println!("token issued");

    let submitted: Value = client
        .post(format!("{}/profiles", base))
        .bearer_auth(&token)
        .json(&json!({
            "profileType": "Female",
            "name": "E2E Member",
            "age": 27,
            "division": "Dhaka",
            "contactEmail": "e2e@example.com",
            "mobileNumber": "01700-000000"
        }))
        .send()
        .await
        .expect("Failed to submit biodata")
        .json()
        .await
        .expect("Invalid submit response");
    println!("submit: {}", submitted);

    let directory: Value = client
        .get(format!("{}/profiles?page=1&pageSize=6", base))
        .send()
        .await
        .expect("Failed to list profiles")
        .json()
        .await
        .expect("Invalid directory response");
    println!(
        "directory: {} items, {} total",
        directory["items"].as_array().map(|a| a.len()).unwrap_or(0),
        directory["totalCount"]
    );

    let similar: Value = client
        .get(format!(
            "{}/profiles/similar?email=nobody@example.com&profileType=Female",
            base
        ))
        .send()
        .await
        .expect("Failed to fetch similar profiles")
        .json()
        .await
        .expect("Invalid similar response");
    println!(
        "similar: {} profiles",
        similar.as_array().map(|a| a.len()).unwrap_or(0)
    );
}
