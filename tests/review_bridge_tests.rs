mod common;

use common::{Fixture, RecordingReview, ReviewCall};
use patchstack::review::ReviewBridge;
use patchstack::PatchStackError;

fn alpha_beta() -> Fixture {
    let fx = Fixture::new();
    fx.navigator().push_new("alpha").unwrap();
    fx.vcs.commit("alpha.txt", "one\n", "Alpha 1");
    fx.navigator().push_new("beta").unwrap();
    fx.vcs.commit("beta.txt", "one\n", "Beta 1");
    fx
}

#[test]
fn test_arcdiff_hands_parent_and_patch_tips() {
    let fx = alpha_beta();
    let review = RecordingReview::new();
    let before = fx.stack();

    let target = ReviewBridge::new(fx.context(), &review).arcdiff(None).unwrap();

    assert_eq!(target.patch, "beta");
    assert_eq!(target.parent, "alpha");
    assert_eq!(
        review.calls(),
        vec![ReviewCall::UploadDiff {
            base: fx.vcs.branch_tip("alpha"),
            head: fx.vcs.branch_tip("beta"),
            update: None,
        }]
    );
    assert_eq!(fx.stack(), before);
}

#[test]
fn test_arcdiff_update_passes_revision() {
    let fx = alpha_beta();
    let review = RecordingReview::new();

    ReviewBridge::new(fx.context(), &review)
        .arcdiff(Some("D1234"))
        .unwrap();

    match review.calls().as_slice() {
        [ReviewCall::UploadDiff { update, .. }] => assert_eq!(update.as_deref(), Some("D1234")),
        other => panic!("unexpected calls {other:?}"),
    }
}

#[test]
fn test_arcland_leaves_stack_alone() {
    let fx = alpha_beta();
    fx.navigator().pop().unwrap();
    let review = RecordingReview::new();
    let before = fx.stack();

    let target = ReviewBridge::new(fx.context(), &review).arcland().unwrap();

    assert_eq!(target.patch, "alpha");
    assert_eq!(
        review.calls(),
        vec![ReviewCall::Land {
            base: fx.vcs.branch_tip("master"),
            head: fx.vcs.branch_tip("alpha"),
        }]
    );
    assert_eq!(fx.stack(), before);
    assert_eq!(fx.position().as_deref(), Some("alpha"));
}

#[test]
fn test_review_refused_at_root_and_off_stack() {
    let fx = alpha_beta();
    let review = RecordingReview::new();
    fx.navigator().pop_all().unwrap();

    let bridge = ReviewBridge::new(fx.context(), &review);
    assert!(matches!(bridge.arcdiff(None), Err(PatchStackError::AtRoot { .. })));
    assert!(matches!(bridge.arcland(), Err(PatchStackError::AtRoot { .. })));

    fx.vcs.add_branch("scratch", "master");
    fx.vcs.switch_to("scratch");
    assert!(matches!(
        bridge.arcland(),
        Err(PatchStackError::NotInStack { .. })
    ));
    assert!(review.calls().is_empty());
}

#[test]
fn test_review_failure_propagates() {
    let fx = alpha_beta();
    let review = RecordingReview::failing();
    let before = fx.stack();

    let err = ReviewBridge::new(fx.context(), &review)
        .arcland()
        .unwrap_err();

    assert!(err.is_collaborator_failure());
    assert_eq!(review.calls().len(), 1);
    assert_eq!(fx.stack(), before);
}
