use askaway::rooms::sync::{RoomFeed, room_path};
use askaway::rooms::{join, mutate};
use askaway::session::User;
use askaway::store::{RealtimeDb, Store};
use pretty_assertions::assert_eq;
use serde_json::{Map, json};

fn ana() -> User {
    User {
        id: "u1".to_owned(),
        name: "Ana".to_owned(),
        avatar_url: "http://x/a.png".to_owned(),
    }
}

async fn seed_room(db: &RealtimeDb, code: &str, title: &str) {
    let patch: Map<_, _> = [("title".to_owned(), json!(title))].into_iter().collect();
    db.update(&room_path(code), patch).await.unwrap();
}

#[tokio::test]
async fn a_room_lives_through_its_whole_flow() {
    let db = RealtimeDb::memory();
    seed_room(&db, "ab12cd", "rustlang").await;

    let summary = join::check_room(&db, "ab12cd").await.unwrap();
    assert_eq!(summary.id, "ab12cd");
    assert_eq!(summary.title, "rustlang");

    let mut feed = RoomFeed::attach(&db, "ab12cd");
    let view = feed.next().await.unwrap();
    assert_eq!(view.title, "rustlang");
    assert!(view.questions.is_empty());

    let ana = ana();
    let id = mutate::post_question(&db, Some(&ana), "ab12cd", "What is X?".to_owned())
        .await
        .unwrap();

    let view = feed.next().await.unwrap();
    assert_eq!(view.questions.len(), 1);
    let question = &view.questions[0];
    assert_eq!(question.id, id);
    assert_eq!(question.content, "What is X?");
    assert_eq!(question.author.name, "Ana");
    assert_eq!(question.author.avatar_url, "http://x/a.png");
    assert!(!question.is_answered);
    assert!(!question.is_highlighted);

    mutate::mark_answered(&db, "ab12cd", &id).await.unwrap();
    let view = feed.next().await.unwrap();
    assert!(view.questions[0].is_answered);

    mutate::delete_question(&db, "ab12cd", &id).await.unwrap();
    let view = feed.next().await.unwrap();
    assert!(view.questions.is_empty());
}

#[tokio::test]
async fn resubscribing_derives_the_same_view() {
    let db = RealtimeDb::memory();
    seed_room(&db, "ab12cd", "rustlang").await;
    mutate::post_question(&db, Some(&ana()), "ab12cd", "What is X?".to_owned())
        .await
        .unwrap();
    mutate::post_question(&db, Some(&ana()), "ab12cd", "And Y?".to_owned())
        .await
        .unwrap();

    let mut first = RoomFeed::attach(&db, "ab12cd");
    let mut second = RoomFeed::attach(&db, "ab12cd");

    assert_eq!(first.next().await.unwrap(), second.next().await.unwrap());
}

#[tokio::test]
async fn an_ended_room_cannot_be_joined() {
    let db = RealtimeDb::memory();
    seed_room(&db, "ab12cd", "rustlang").await;
    mutate::end_room(&db, "ab12cd").await.unwrap();

    assert!(join::check_room(&db, "ab12cd").await.is_err());
}
