mod common;

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use attendance_kiosk::client::ApiClient;
use attendance_kiosk::config::Config;
use attendance_kiosk::error::AppError;
use attendance_kiosk::routes;

use common::{kolkata, state_at};

#[actix_web::test]
async fn client_drives_a_running_server() {
    let (_store, state) = state_at(kolkata(2024, 6, 1, 10, 0));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(Data::new(state.clone()))
            .configure(|cfg| routes::configure(cfg, &Config::local()))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let client = ApiClient::new(format!("http://{addr}/api/"));

    let asha = client.add_employee("Asha").await.unwrap();
    assert_eq!(asha.id, 1);
    assert!(matches!(
        client.add_employee(" ").await,
        Err(AppError::Validation(_))
    ));

    let rec = client.mark_attendance(asha.id, Some("kiosk-A")).await.unwrap();
    assert_eq!(rec.arrival_time, "10:00");
    assert_eq!(
        client.mark_attendance(asha.id, None).await.unwrap_err(),
        AppError::Duplicate("Already marked for today".into())
    );

    let matrix = client.monthly_matrix("2024-06".parse().unwrap()).await.unwrap();
    assert_eq!(matrix.row(asha.id).unwrap().days[0].as_ref(), Some(&rec));

    let renamed = client.rename_employee(asha.id, "Asha K").await.unwrap();
    assert_eq!(renamed.name, "Asha K");
    assert_eq!(client.today_count().await.unwrap().count, 1);

    client.deactivate_employee(asha.id).await.unwrap();
    assert!(client.list_employees().await.unwrap().is_empty());
    assert!(!client.get_employee(asha.id).await.unwrap().active);
    assert!(matches!(
        client.deactivate_employee(42).await,
        Err(AppError::NotFound(_))
    ));

    let back = client.set_employee_active(asha.id, true).await.unwrap();
    assert!(back.active);

    handle.stop(true).await;
}
