use kinship_core::db::open_db_in_memory;
use kinship_core::{
    CollaboratorError, ErrorKind, FriendDirectory, InterfaceMode, InterfaceService,
    ItemDirectory, LabelService, LedgerError, LedgerService, PokeOutcome, SharingError,
    SharingService, SqliteInterfaceRepository, SqliteLabelRepository, SqliteMessageRepository,
    UserId, DEFAULT_POKE_TEXT,
};
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// In-memory stand-in for the post and friendship stores.
#[derive(Default)]
struct Directory {
    authors: HashMap<Uuid, UserId>,
    friendships: HashSet<(UserId, UserId)>,
}

impl Directory {
    fn befriend(&mut self, first: UserId, second: UserId) {
        self.friendships.insert((first, second));
        self.friendships.insert((second, first));
    }

    fn publish(&mut self, author: UserId) -> Uuid {
        let item = Uuid::new_v4();
        self.authors.insert(item, author);
        item
    }
}

impl ItemDirectory for Directory {
    fn author_of(&self, item: Uuid) -> Result<UserId, CollaboratorError> {
        self.authors
            .get(&item)
            .copied()
            .ok_or_else(|| CollaboratorError::not_found(format!("post {item} not found")))
    }
}

impl FriendDirectory for Directory {
    fn is_friend_or_self(&self, first: UserId, second: UserId) -> Result<bool, CollaboratorError> {
        Ok(first == second || self.friendships.contains(&(first, second)))
    }
}

type Sharing<'a> = SharingService<
    SqliteLabelRepository<'a>,
    SqliteMessageRepository<'a>,
    SqliteInterfaceRepository<'a>,
    &'a Directory,
    &'a Directory,
>;

fn sharing<'a>(conn: &'a Connection, directory: &'a Directory) -> Sharing<'a> {
    SharingService::new(
        LabelService::new(SqliteLabelRepository::try_new(conn).unwrap()),
        LedgerService::new(SqliteMessageRepository::try_new(conn).unwrap()),
        InterfaceService::new(SqliteInterfaceRepository::try_new(conn).unwrap()),
        directory,
        directory,
    )
}

struct People {
    author: UserId,
    friend: UserId,
    other_friend: UserId,
    stranger: UserId,
}

fn people(directory: &mut Directory) -> People {
    let people = People {
        author: Uuid::new_v4(),
        friend: Uuid::new_v4(),
        other_friend: Uuid::new_v4(),
        stranger: Uuid::new_v4(),
    };
    directory.befriend(people.author, people.friend);
    directory.befriend(people.author, people.other_friend);
    people
}

#[test]
fn friends_of_the_author_may_share_the_item() {
    let conn = open_db_in_memory().unwrap();
    let mut directory = Directory::default();
    let p = people(&mut directory);
    let item = directory.publish(p.author);
    let sharing = sharing(&conn, &directory);

    let sent = sharing
        .send_message(p.friend, p.other_friend, Some(item), Some("see this".to_string()))
        .unwrap();
    assert_eq!(sent.delivery.record.sender, p.friend);
    assert_eq!(sharing.ledger().receiver_of(sent.content).unwrap(), p.other_friend);

    let from_author = sharing
        .send_message(p.author, p.friend, Some(item), None)
        .unwrap();
    assert_eq!(sharing.ledger().sender_of(from_author.content).unwrap(), p.author);
}

#[test]
fn sharing_with_a_stranger_is_refused_before_delivery() {
    let conn = open_db_in_memory().unwrap();
    let mut directory = Directory::default();
    let p = people(&mut directory);
    let item = directory.publish(p.author);
    let sharing = sharing(&conn, &directory);

    let err = sharing
        .send_message(p.friend, p.stranger, Some(item), None)
        .unwrap_err();
    assert!(matches!(err, SharingError::SharingNotAuthorized { item: id } if id == item));
    assert_eq!(err.kind(), ErrorKind::NotAllowed);

    let err = sharing
        .send_message(p.stranger, p.author, Some(item), None)
        .unwrap_err();
    assert!(matches!(err, SharingError::SharingNotAuthorized { .. }));

    // Orphaned content persists but was never delivered.
    let contents = sharing.ledger().all_contents().unwrap();
    assert_eq!(contents.len(), 2);
    for content in contents {
        let err = sharing.ledger().record_of(content.id).unwrap_err();
        assert!(matches!(err, LedgerError::RecordNotFound(_)));
    }
    assert!(sharing.ledger().all_records().unwrap().is_empty());
}

#[test]
fn plain_text_messages_are_unrestricted() {
    let conn = open_db_in_memory().unwrap();
    let mut directory = Directory::default();
    let p = people(&mut directory);
    let sharing = sharing(&conn, &directory);

    let sent = sharing
        .send_message(p.stranger, p.friend, None, Some("hello".to_string()))
        .unwrap();
    assert_eq!(sharing.ledger().sender_of(sent.content).unwrap(), p.stranger);
}

#[test]
fn unknown_item_surfaces_collaborator_error_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let mut directory = Directory::default();
    let p = people(&mut directory);
    let sharing = sharing(&conn, &directory);

    let err = sharing
        .send_message(p.author, p.friend, Some(Uuid::new_v4()), None)
        .unwrap_err();
    assert!(matches!(err, SharingError::Collaborator(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn shared_item_search_uses_labels_of_items_in_the_users_messages() {
    let conn = open_db_in_memory().unwrap();
    let mut directory = Directory::default();
    let p = people(&mut directory);
    let beach = directory.publish(p.author);
    let office = directory.publish(p.author);
    let sharing = sharing(&conn, &directory);

    sharing.on_item_created(beach).unwrap();
    sharing.on_item_created(office).unwrap();
    sharing.add_label(p.author, beach, "summer-trip").unwrap();
    sharing.add_label(p.author, office, "work").unwrap();

    sharing
        .send_message(p.author, p.friend, Some(beach), None)
        .unwrap();
    sharing
        .send_message(p.friend, p.author, Some(office), None)
        .unwrap();
    sharing
        .send_message(p.friend, p.author, None, Some("plain".to_string()))
        .unwrap();

    assert_eq!(sharing.search_shared_items(p.friend, "trip").unwrap(), vec![beach]);
    assert_eq!(sharing.search_shared_items(p.author, "o").unwrap(), vec![office]);
    assert_eq!(sharing.messages_of(p.friend).unwrap().len(), 3);
}

#[test]
fn shared_item_search_fails_when_a_shared_item_has_no_labels() {
    let conn = open_db_in_memory().unwrap();
    let mut directory = Directory::default();
    let p = people(&mut directory);
    let item = directory.publish(p.author);
    let sharing = sharing(&conn, &directory);

    sharing
        .send_message(p.author, p.friend, Some(item), None)
        .unwrap();
    let err = sharing.search_shared_items(p.friend, "x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn only_the_sender_may_delete_a_message() {
    let conn = open_db_in_memory().unwrap();
    let mut directory = Directory::default();
    let p = people(&mut directory);
    let sharing = sharing(&conn, &directory);
    let sent = sharing
        .send_message(p.author, p.friend, None, Some("oops".to_string()))
        .unwrap();

    let err = sharing.delete_message(p.friend, sent.content).unwrap_err();
    assert!(matches!(err, SharingError::NotSender { .. }));
    assert!(sharing.ledger().record_of(sent.content).is_ok());

    sharing.delete_message(p.author, sent.content).unwrap();
    let err = sharing.delete_message(p.author, sent.content).unwrap_err();
    assert!(matches!(
        err,
        SharingError::Ledger(LedgerError::RecordNotFound(_))
    ));
}

#[test]
fn label_edits_require_authorship() {
    let conn = open_db_in_memory().unwrap();
    let mut directory = Directory::default();
    let p = people(&mut directory);
    let item = directory.publish(p.author);
    let sharing = sharing(&conn, &directory);
    sharing.on_item_created(item).unwrap();

    let err = sharing.add_label(p.friend, item, "hijack").unwrap_err();
    assert!(matches!(err, SharingError::NotAuthor { .. }));
    assert_eq!(err.kind(), ErrorKind::NotAllowed);

    sharing.add_label(p.author, item, "a").unwrap();
    sharing.add_label(p.author, item, "b").unwrap();
    sharing.add_label(p.author, item, "a").unwrap();
    assert!(sharing.remove_label_by_index(p.friend, item, "1").is_err());
    assert!(sharing.remove_label_by_content(p.friend, item, "a").is_err());
    assert!(sharing.labels_for_author(p.friend, item).is_err());

    sharing.remove_label_by_content(p.author, item, "a").unwrap();
    sharing.remove_label_by_index(p.author, item, "1").unwrap();
    assert!(sharing
        .labels_for_author(p.author, item)
        .unwrap()
        .labels
        .is_empty());

    let err = sharing.on_item_created(item).unwrap_err();
    assert!(matches!(err, SharingError::Labels(_)));
    assert_eq!(err.kind(), ErrorKind::NotAllowed);
}

#[test]
fn poke_reaches_friends_in_leisure_mode_only() {
    let conn = open_db_in_memory().unwrap();
    let mut directory = Directory::default();
    let p = people(&mut directory);
    let sharing = sharing(&conn, &directory);
    sharing.on_user_created(p.author).unwrap();
    sharing.on_user_created(p.friend).unwrap();

    assert_eq!(
        sharing.poke(p.author, p.friend, None).unwrap(),
        PokeOutcome::LockedIn
    );
    assert!(sharing.ledger().all_records().unwrap().is_empty());

    assert_eq!(
        sharing.set_interface(p.friend, "Leisure").unwrap(),
        InterfaceMode::Leisure
    );
    let outcome = sharing.poke(p.author, p.friend, None).unwrap();
    let PokeOutcome::Poked { content, text } = outcome else {
        panic!("expected a poke to be delivered");
    };
    assert_eq!(text, DEFAULT_POKE_TEXT);
    assert_eq!(sharing.ledger().receiver_of(content).unwrap(), p.friend);
    assert_eq!(sharing.ledger().content_of(content).unwrap().item, None);

    let err = sharing.poke(p.stranger, p.friend, None).unwrap_err();
    assert!(matches!(err, SharingError::NotFriends { .. }));
}

#[test]
fn interface_checks_are_limited_to_friends_and_self() {
    let conn = open_db_in_memory().unwrap();
    let mut directory = Directory::default();
    let p = people(&mut directory);
    let sharing = sharing(&conn, &directory);
    sharing.on_user_created(p.author).unwrap();

    assert_eq!(
        sharing.check_interface(p.author, p.author).unwrap(),
        InterfaceMode::Focus
    );
    assert_eq!(
        sharing.check_interface(p.friend, p.author).unwrap(),
        InterfaceMode::Focus
    );
    let err = sharing.check_interface(p.stranger, p.author).unwrap_err();
    assert!(matches!(err, SharingError::NotFriends { .. }));

    let err = sharing.set_interface(p.author, "Sleep").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadInput);
    let err = sharing.check_interface(p.author, p.friend).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
