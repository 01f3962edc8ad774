//! `CaseRepositoryPort::list_for_owner` filtering and pagination contract.

mod common;

use investigate_core::{CaseFilters, CaseRepositoryPort, CaseStatus, Pagination};

#[tokio::test]
async fn list_for_owner_filters_by_status_and_paginates() {
    let repo = common::InMemoryRepo::new(common::bare_case("case-a", "user-1", CaseStatus::Investigating));
    repo.save(&common::bare_case("case-b", "user-1", CaseStatus::Resolved), true)
        .await
        .unwrap();
    repo.save(&common::bare_case("case-c", "user-1", CaseStatus::Investigating), true)
        .await
        .unwrap();
    repo.save(&common::bare_case("case-d", "user-2", CaseStatus::Investigating), true)
        .await
        .unwrap();

    let all_for_user_1 = repo
        .list_for_owner("user-1", CaseFilters::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(all_for_user_1.len(), 3, "user-2's case must not leak into user-1's listing");

    let investigating_only = repo
        .list_for_owner(
            "user-1",
            CaseFilters { status: Some(CaseStatus::Investigating) },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(investigating_only.len(), 2);
    assert!(investigating_only.iter().all(|c| c.status == CaseStatus::Investigating));

    let first_page = repo
        .list_for_owner("user-1", CaseFilters::default(), Pagination { limit: 2, offset: 0 })
        .await
        .unwrap();
    assert_eq!(first_page.len(), 2);

    let second_page = repo
        .list_for_owner("user-1", CaseFilters::default(), Pagination { limit: 2, offset: 2 })
        .await
        .unwrap();
    assert_eq!(second_page.len(), 1);
}
