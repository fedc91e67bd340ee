#[rocket::launch]
fn rocket() -> _ {
    dotenvy::dotenv().ok();
    warbler::telemetry::init();
    warbler::rocket()
}
