use crate::{
	tests::{fixtures::TestFixtures, test_utils::memory_handler},
	user_routes,
};
use actix_web::{http::Method, test, web, App};
use serde_json::Value;

macro_rules! app {
	($handler:expr) => {
		test::init_service(
			App::new().app_data(web::Data::new($handler)).configure(user_routes::init),
		)
		.await
	};
}

#[actix_web::test]
async fn test_preflight_over_http() {
	let (_, handler) = memory_handler();
	let app = app!(handler);

	let resp = test::TestRequest::default()
		.method(Method::OPTIONS)
		.uri("/")
		.set_payload("garbage that is never parsed")
		.send_request(&app)
		.await;

	assert_eq!(resp.status().as_u16(), 200);
	assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
	assert_eq!(
		resp.headers().get("access-control-allow-headers").unwrap(),
		"Content-Type, X-Auth-Token"
	);
	let body = test::read_body(resp).await;
	assert!(body.is_empty());
}

#[actix_web::test]
async fn test_complete_user_flow() {
	let (_, handler) = memory_handler();
	let app = app!(handler);

	// Step 1: register
	let register_resp = test::TestRequest::post()
		.uri("/")
		.set_json(TestFixtures::valid_registration())
		.send_request(&app)
		.await;
	assert!(register_resp.status().is_success(), "Registration failed");
	assert_eq!(register_resp.headers().get("content-type").unwrap(), "application/json");
	let registered: Value = test::read_body_json(register_resp).await;
	let token = registered["token"].as_str().unwrap().to_string();

	// Step 2: account snapshot, header name in lower case
	let me_resp = test::TestRequest::post()
		.uri("/auth")
		.insert_header(("x-auth-token", token.clone()))
		.set_json(TestFixtures::action("me"))
		.send_request(&app)
		.await;
	assert!(me_resp.status().is_success(), "Snapshot failed");
	let me: Value = test::read_body_json(me_resp).await;
	assert_eq!(me["user"]["id"], registered["user"]["id"]);
	assert_eq!(me["wallets"].as_object().unwrap().len(), 4);

	// Step 3: logout
	let logout_resp = test::TestRequest::post()
		.uri("/")
		.insert_header(("X-Auth-Token", token.clone()))
		.set_json(TestFixtures::action("logout"))
		.send_request(&app)
		.await;
	let logout: Value = test::read_body_json(logout_resp).await;
	assert_eq!(logout["ok"], true);

	// Step 4: the token is dead
	let denied = test::TestRequest::post()
		.uri("/")
		.insert_header(("X-Auth-Token", token))
		.set_json(TestFixtures::action("me"))
		.send_request(&app)
		.await;
	assert_eq!(denied.status().as_u16(), 401);
	assert_eq!(denied.headers().get("access-control-allow-origin").unwrap(), "*");
}

#[actix_web::test]
async fn test_duplicate_registration_over_http() {
	let (store, handler) = memory_handler();
	let app = app!(handler);

	for expected in [200, 409] {
		let resp = test::TestRequest::post()
			.uri("/")
			.set_json(TestFixtures::valid_registration())
			.send_request(&app)
			.await;
		assert_eq!(resp.status().as_u16(), expected);
	}
	assert_eq!(store.user_count(), 1);
}

#[actix_web::test]
async fn test_unknown_action_over_http() {
	let (_, handler) = memory_handler();
	let app = app!(handler);

	let resp = test::TestRequest::get().uri("/").send_request(&app).await;
	assert!(resp.status().is_client_error());
	let body: Value = test::read_body_json(resp).await;
	assert_eq!(body["error"], "unknown action");
}
