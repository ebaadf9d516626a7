use giftdesk_core::model::user::{Role, UserInput};
use giftdesk_core::repo::user_repo::SqliteUserRepository;
use giftdesk_core::{
    authorize, bearer_token, open_db_in_memory, AuthError, Permission, StaticTokenIdentity,
    UserService,
};

fn seed(conn: &rusqlite::Connection) {
    let users = UserService::new(SqliteUserRepository::new(conn));
    for (name, email, role) in [
        ("Root", "root@example.com", Role::Admin),
        ("Asha", "asha@example.com", Role::Editor),
        ("Ravi", "ravi@example.com", Role::Viewer),
    ] {
        users
            .create_user(&UserInput {
                name: name.to_string(),
                email: email.to_string(),
                role,
            })
            .unwrap();
    }
}

fn identity() -> StaticTokenIdentity {
    StaticTokenIdentity::from_pairs(
        "admin-token=root@example.com, editor-token=ASHA@example.com\n\
         viewer-token=ravi@example.com,ghost-token=ghost@example.com,broken",
    )
}

#[test]
fn session_table_skips_malformed_pairs() {
    assert_eq!(identity().len(), 4);
    assert!(StaticTokenIdentity::from_pairs("").is_empty());
}

#[test]
fn roles_gate_permissions() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let repo = SqliteUserRepository::new(&conn);
    let identity = identity();

    let viewer = authorize(&identity, &repo, Some("viewer-token"), Permission::Read).unwrap();
    assert_eq!(viewer.role, Role::Viewer);
    assert!(matches!(
        authorize(&identity, &repo, Some("viewer-token"), Permission::WriteCatalog),
        Err(AuthError::Forbidden {
            role: Role::Viewer,
            permission: Permission::WriteCatalog
        })
    ));

    let editor =
        authorize(&identity, &repo, Some("editor-token"), Permission::WriteCatalog).unwrap();
    assert_eq!(editor.email, "asha@example.com");
    assert!(authorize(&identity, &repo, Some("editor-token"), Permission::ManageUsers).is_err());

    assert!(authorize(&identity, &repo, Some("admin-token"), Permission::ManageUsers).is_ok());
}

#[test]
fn unknown_sessions_and_identities_are_denied() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let repo = SqliteUserRepository::new(&conn);
    let identity = identity();

    let missing = authorize(&identity, &repo, None, Permission::Read).unwrap_err();
    assert!(matches!(missing, AuthError::MissingToken));

    assert!(matches!(
        authorize(&identity, &repo, Some("nope"), Permission::Read),
        Err(AuthError::UnknownSession)
    ));
    assert!(matches!(
        authorize(&identity, &repo, Some("ghost-token"), Permission::Read),
        Err(AuthError::UnknownUser(_))
    ));
}

#[test]
fn bearer_token_parses_authorization_header() {
    assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
    assert_eq!(bearer_token("bearer   abc123 "), Some("abc123"));
    assert_eq!(bearer_token("Basic abc123"), None);
    assert_eq!(bearer_token("Bearer "), None);
}
