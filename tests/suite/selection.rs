//! Selection and navigation over a fetched list.

use roster_engine::{Phase, SelectError};

use crate::common::{app_for, mount_users, sample_users, start_and_settle, start_users_mock};

#[tokio::test]
async fn selecting_a_row_sets_exactly_that_user() {
    let server = start_users_mock().await;
    mount_users(&server, sample_users()).await;
    let mut app = app_for(&server);
    start_and_settle(&mut app).await;

    let before: Vec<_> = app.users().to_vec();
    app.select_row(1).unwrap();

    let selected = app.selected().unwrap();
    assert_eq!(selected.name, "Ervin Howell");
    assert_eq!(selected.email, "Shanna@melissa.tv");
    assert_eq!(selected.company_name(), "Deckow-Crist");
    assert_eq!(app.users(), before.as_slice());
    assert_eq!(app.phase(), Phase::Loaded);

    app.select_row(2).unwrap();
    assert_eq!(app.selected().map(|u| u.name.as_str()), Some("Clementine Bauch"));
}

#[tokio::test]
async fn out_of_range_selection_is_rejected() {
    let server = start_users_mock().await;
    mount_users(&server, sample_users()).await;
    let mut app = app_for(&server);
    start_and_settle(&mut app).await;

    assert_eq!(
        app.select_row(3),
        Err(SelectError::OutOfRange { index: 3, len: 3 })
    );
    assert!(app.selected().is_none());
}

#[tokio::test]
async fn keyboard_style_navigation_then_select() {
    let server = start_users_mock().await;
    mount_users(&server, sample_users()).await;
    let mut app = app_for(&server);
    start_and_settle(&mut app).await;

    app.end();
    app.move_up();
    assert!(app.select_highlighted());
    assert_eq!(app.selected().map(|u| u.name.as_str()), Some("Ervin Howell"));

    app.home();
    let rows = app.rows();
    assert!(rows[0].highlighted);
    assert!(rows[1].selected);
}
