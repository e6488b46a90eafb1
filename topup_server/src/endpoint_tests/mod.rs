mod admin;
mod checkout;
mod helpers;
mod mocks;
mod products;
mod transactions;

mod misc {
    use actix_web::{body::MessageBody, test, test::TestRequest, App};

    use crate::routes::health;

    #[actix_web::test]
    async fn health_check() {
        let app = test::init_service(App::new().service(health)).await;
        let req = TestRequest::get().uri("/health").to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
        let body = res.into_body().try_into_bytes().expect("body should be complete");
        assert_eq!(body.as_ref(), "👍️\n".as_bytes());
    }
}
