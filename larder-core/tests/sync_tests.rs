//! Sync reconciler tests over the in-memory remote and local doubles.

use larder_core::{
    Category, MemoryStore, MockRemoteStore, Recipe, RecipeStore, SyncError, SyncOutcome,
    SyncReconciler, RECIPES_FILE,
};

const TOKEN: Option<&str> = Some("test-token");

fn recipe(title: &str, category: Category, steps: &[&str]) -> Recipe {
    Recipe {
        id: 0,
        title: title.to_string(),
        image: None,
        ingredients: Some(vec!["something".to_string()]),
        steps: Some(steps.iter().map(|s| s.to_string()).collect()),
        url: String::new(),
        category,
        sub_category: String::new(),
        tags: Vec::new(),
    }
}

fn remote_with(recipes: &[Recipe]) -> MockRemoteStore {
    let body = serde_json::to_string(recipes).unwrap();
    MockRemoteStore::new().with_file(RECIPES_FILE, &body)
}

#[tokio::test]
async fn pull_without_remote_file_reports_nothing_to_sync() {
    let reconciler = SyncReconciler::new(MockRemoteStore::new(), MemoryStore::new());

    let outcome = reconciler.pull(TOKEN).await.unwrap();
    assert_eq!(outcome, SyncOutcome::NothingToSync);
    assert_eq!(outcome.status_line(), "No recipes.json found on remote");
}

#[tokio::test]
async fn pull_inserts_only_recipes_absent_locally() {
    let remote = remote_with(&[
        recipe("Cake", Category::Sweet, &["remote cake step"]),
        recipe("Soup", Category::Savory, &["remote soup step"]),
    ]);

    let store = MemoryStore::new();
    store
        .insert(&recipe("Cake", Category::Sweet, &["local cake step"]))
        .unwrap();

    let reconciler = SyncReconciler::new(remote, store);
    let outcome = reconciler.pull(TOKEN).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Pulled { considered: 2 });
    assert_eq!(outcome.status_line(), "Sync completed: 2 recipes");

    // Soup arrived; the local Cake was never touched (local wins).
    let rows = reconciler.store().all().unwrap();
    assert_eq!(rows.len(), 2);
    let cake = reconciler.store().find("Cake", Category::Sweet).unwrap().unwrap();
    assert_eq!(cake.steps, Some(vec!["local cake step".to_string()]));
    assert!(reconciler
        .store()
        .find("Soup", Category::Savory)
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn pull_keeps_local_version_on_conflict() {
    let remote = remote_with(&[recipe("Cake", Category::Sweet, &["remote step"])]);
    let store = MemoryStore::new();
    store
        .insert(&recipe("Cake", Category::Sweet, &["local step"]))
        .unwrap();

    let reconciler = SyncReconciler::new(remote, store);
    reconciler.pull(TOKEN).await.unwrap();

    let rows = reconciler.store().all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].steps, Some(vec!["local step".to_string()]));
}

#[tokio::test]
async fn pull_twice_is_idempotent() {
    let remote = remote_with(&[
        recipe("Cake", Category::Sweet, &["step"]),
        recipe("Soup", Category::Savory, &["step"]),
    ]);

    let reconciler = SyncReconciler::new(remote, MemoryStore::new());
    reconciler.pull(TOKEN).await.unwrap();
    let after_first = reconciler.store().all().unwrap();

    let outcome = reconciler.pull(TOKEN).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Pulled { considered: 2 });

    let after_second = reconciler.store().all().unwrap();
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn push_creates_then_overwrites_the_single_file() {
    let store = MemoryStore::new();
    store
        .insert(&recipe("Cake", Category::Sweet, &["step"]))
        .unwrap();

    let reconciler = SyncReconciler::new(MockRemoteStore::new(), store);

    let outcome = reconciler.push(TOKEN).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Pushed { count: 1 });
    assert_eq!(outcome.status_line(), "Recipes uploaded successfully");
    assert_eq!(reconciler.remote().file_count(), 1);

    reconciler
        .store()
        .insert(&recipe("Soup", Category::Savory, &["step"]))
        .unwrap();
    let outcome = reconciler.push(TOKEN).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Pushed { count: 2 });
    // Still one file: the second push overwrote it in place.
    assert_eq!(reconciler.remote().file_count(), 1);

    let body = reconciler.remote().file_content(RECIPES_FILE).unwrap();
    let uploaded: Vec<Recipe> = serde_json::from_str(&body).unwrap();
    assert_eq!(uploaded.len(), 2);
}

#[tokio::test]
async fn push_then_pull_round_trips_the_collection() {
    let source = MemoryStore::new();
    source
        .insert(&recipe("Cake", Category::Sweet, &["bake it"]))
        .unwrap();
    source
        .insert(&recipe("Soup", Category::Savory, &["simmer it"]))
        .unwrap();

    let pusher = SyncReconciler::new(MockRemoteStore::new(), source);
    pusher.push(TOKEN).await.unwrap();
    let body = pusher.remote().file_content(RECIPES_FILE).unwrap();

    let puller = SyncReconciler::new(
        MockRemoteStore::new().with_file(RECIPES_FILE, &body),
        MemoryStore::new(),
    );
    puller.pull(TOKEN).await.unwrap();

    let mut original: Vec<_> = pusher
        .store()
        .all()
        .unwrap()
        .into_iter()
        .map(|r| (r.title, r.category, r.ingredients, r.steps))
        .collect();
    let mut restored: Vec<_> = puller
        .store()
        .all()
        .unwrap()
        .into_iter()
        .map(|r| (r.title, r.category, r.ingredients, r.steps))
        .collect();
    original.sort();
    restored.sort();
    assert_eq!(original, restored);
}

#[tokio::test]
async fn sync_without_token_is_not_authorized() {
    let reconciler = SyncReconciler::new(MockRemoteStore::new(), MemoryStore::new());

    assert!(matches!(
        reconciler.pull(None).await,
        Err(SyncError::NotAuthorized)
    ));
    assert!(matches!(
        reconciler.push(None).await,
        Err(SyncError::NotAuthorized)
    ));
    // The precondition is checked before any remote call is attempted.
    assert_eq!(reconciler.remote().file_count(), 0);
}

#[tokio::test]
async fn pull_surfaces_remote_failure_without_local_changes() {
    let remote = remote_with(&[recipe("Cake", Category::Sweet, &["step"])])
        .with_broken_download(RECIPES_FILE);

    let reconciler = SyncReconciler::new(remote, MemoryStore::new());
    let err = reconciler.pull(TOKEN).await.unwrap_err();
    assert!(matches!(err, SyncError::Remote(_)));
    assert!(reconciler.store().all().unwrap().is_empty());
}

#[tokio::test]
async fn pull_of_malformed_collection_is_a_decode_error() {
    let remote = MockRemoteStore::new().with_file(RECIPES_FILE, "not json at all");
    let reconciler = SyncReconciler::new(remote, MemoryStore::new());

    assert!(matches!(
        reconciler.pull(TOKEN).await,
        Err(SyncError::Serde(_))
    ));
}
