mod common;

use common::{
    connected, harness, harness_with, owner, owner_with_vault, stub_gateway, tokens, user,
    vault_address, RepeatingHashGateway,
};
use vault_console::controller::ActionOutcome;
use vault_console::error::ValidationError;
use vault_console::models::{Address, TxKind, TxStatus};
use vault_console::notify::Severity;

#[tokio::test]
async fn test_claim_confirms_after_receipt() {
    let h = owner_with_vault(50).await;

    let outcome = h.controller.claim("10").await;
    let hashes = match outcome {
        ActionOutcome::Submitted(hashes) => hashes,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(hashes.len(), 1);

    let history = h.controller.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, TxKind::Claim);
    assert_eq!(history[0].amount, "10");
    assert_eq!(history[0].status(), TxStatus::Pending);
    assert_eq!(history[0].external_id(), Some(&hashes[0]));

    assert_eq!(h.controller.watch_pending().await, 1);

    let history = h.controller.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status(), TxStatus::Confirmed);
    assert_eq!(h.gateway.balance(&vault_address()), tokens(40));
    assert_eq!(h.gateway.balance(&owner()), tokens(10));
    assert_eq!(
        h.notifier.messages(),
        vec!["Transaction confirmed!".to_string()]
    );
}

#[tokio::test]
async fn test_claim_with_lowercase_owner_address() {
    let h = harness();
    h.gateway
        .set_owner(Some(Address::new(owner().as_str().to_lowercase())));
    h.gateway.mint(&vault_address(), tokens(5));
    h.controller.connect(owner()).await;

    assert!(h.controller.is_owner().await);
    assert!(matches!(
        h.controller.claim("5").await,
        ActionOutcome::Submitted(_)
    ));
}

#[tokio::test]
async fn test_claim_hidden_for_non_owner() {
    let h = connected(user(), 10).await;
    h.gateway.set_owner(Some(owner()));
    h.gateway.mint(&vault_address(), tokens(50));

    assert_eq!(h.controller.claim("10").await, ActionOutcome::NotPermitted);
    assert!(h.controller.history().await.is_empty());
    assert!(h.notifier.toasts().is_empty());

    let controls = h.controller.controls().await;
    assert!(!controls.claim_visible);
    assert!(!controls.claim_enabled);
    assert!(controls.send_enabled);
}

#[tokio::test]
async fn test_claim_hidden_while_owner_unknown() {
    let h = connected(owner(), 0).await;
    h.gateway.mint(&vault_address(), tokens(50));

    assert_eq!(h.controller.owner().await, None);
    assert!(!h.controller.is_owner().await);
    assert_eq!(h.controller.claim("1").await, ActionOutcome::NotPermitted);
    assert!(h.notifier.toasts().is_empty());
}

#[tokio::test]
async fn test_claim_above_vault_balance_is_invalid() {
    let h = owner_with_vault(50).await;

    let outcome = h.controller.claim("60").await;

    assert_eq!(
        outcome,
        ActionOutcome::Invalid(ValidationError::ExceedsBalance {
            requested: tokens(60),
            available: tokens(50),
        })
    );
    assert!(h.controller.history().await.is_empty());
    assert_eq!(h.notifier.toasts()[0].severity, Severity::Error);
}

#[tokio::test]
async fn test_deposit_toasts_and_records() {
    let h = connected(user(), 20).await;

    let outcome = h.controller.deposit("12.5").await;
    assert!(matches!(outcome, ActionOutcome::Submitted(ref hashes) if hashes.len() == 2));

    let history = h.controller.history().await;
    assert_eq!(history.len(), 2);
    // Newest first
    assert_eq!(history[0].kind, TxKind::Send);
    assert_eq!(history[1].kind, TxKind::Approve);
    assert!(history.iter().all(|r| r.amount == "12.5"));

    assert_eq!(h.notifier.messages(), vec!["Approving...".to_string()]);

    assert_eq!(h.controller.watch_pending().await, 2);
    assert!(h
        .controller
        .history()
        .await
        .iter()
        .all(|r| r.status() == TxStatus::Confirmed));
    assert_eq!(h.controller.balance_summary().await, "Vault Balance: 12.5 MTK");
}

#[tokio::test]
async fn test_deposit_rejected_approve_uses_provider_message() {
    let h = connected(user(), 20).await;
    h.gateway.reject_next("User rejected the request.");

    let outcome = h.controller.deposit("10").await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed {
            kind: TxKind::Approve,
            message: "User rejected the request.".to_string(),
        }
    );
    let history = h.controller.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status(), TxStatus::Failed);
    assert_eq!(h.notifier.toasts()[0].severity, Severity::Error);

    // View stays usable
    let controls = h.controller.controls().await;
    assert_eq!(controls.busy, None);
    assert!(controls.send_enabled);
}

#[tokio::test]
async fn test_deposit_rejection_without_message_uses_fallback() {
    let h = connected(user(), 20).await;
    h.gateway.reject_next("");

    let outcome = h.controller.deposit("10").await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed {
            kind: TxKind::Approve,
            message: "Error sending".to_string(),
        }
    );
    assert_eq!(h.notifier.messages(), vec!["Error sending".to_string()]);
}

#[tokio::test]
async fn test_claim_rejection_without_message_uses_fallback() {
    let h = owner_with_vault(50).await;
    h.gateway.reject_next("  ");

    let outcome = h.controller.claim("10").await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed {
            kind: TxKind::Claim,
            message: "Error claiming".to_string(),
        }
    );
}

#[tokio::test]
async fn test_deposit_requires_account() {
    let h = harness();

    assert_eq!(h.controller.deposit("1").await, ActionOutcome::NotConnected);
    assert_eq!(h.controller.claim("1").await, ActionOutcome::NotConnected);
    assert!(!h.controller.controls().await.send_enabled);
}

#[tokio::test]
async fn test_invalid_amount_never_starts_sequence() {
    let h = connected(user(), 20).await;

    for text in ["", "0", "abc", "-5", "21"] {
        let outcome = h.controller.deposit(text).await;
        assert!(matches!(outcome, ActionOutcome::Invalid(_)), "{:?}", text);
    }

    assert!(h.controller.history().await.is_empty());
    assert!(h.gateway.writes().is_empty());
    assert_eq!(h.notifier.toasts().len(), 5);
}

#[tokio::test]
async fn test_reverted_receipt_marks_failed() {
    let h = owner_with_vault(50).await;
    h.gateway.revert_next();

    assert!(matches!(h.controller.claim("10").await, ActionOutcome::Submitted(_)));
    assert_eq!(h.controller.watch_pending().await, 1);

    let history = h.controller.history().await;
    assert_eq!(history[0].status(), TxStatus::Failed);
    assert_eq!(h.notifier.messages(), vec!["Transaction failed".to_string()]);
    assert_eq!(h.gateway.balance(&vault_address()), tokens(50));
}

#[tokio::test]
async fn test_busy_until_confirmed() {
    let h = connected(user(), 20).await;

    assert!(matches!(h.controller.deposit("5").await, ActionOutcome::Submitted(_)));

    let controls = h.controller.controls().await;
    assert_eq!(controls.busy, Some(TxKind::Send));
    assert!(!controls.send_enabled);

    assert_eq!(h.controller.deposit("5").await, ActionOutcome::Busy);
    assert_eq!(h.controller.history().await.len(), 2);

    h.controller.watch_pending().await;

    assert!(h.controller.controls().await.send_enabled);
    assert!(matches!(h.controller.deposit("5").await, ActionOutcome::Submitted(_)));
}

#[tokio::test]
async fn test_max_amount() {
    let h = connected(user(), 20).await;
    h.gateway.mint(&vault_address(), tokens(7) / 2);

    assert_eq!(h.controller.max_amount(TxKind::Send).await.unwrap(), "20");
    assert_eq!(h.controller.max_amount(TxKind::Claim).await.unwrap(), "3.5");
}

#[tokio::test]
async fn test_balance_summary_rounds() {
    let h = harness();
    h.gateway.mint(&vault_address(), 1_234_567_000_000_000_000);

    assert_eq!(h.controller.balance_summary().await, "Vault Balance: 1.2346 MTK");
}

#[tokio::test]
async fn test_export_history_and_unmount() {
    let h = connected(user(), 20).await;
    h.controller.deposit("3").await;

    let mut output = Vec::new();
    h.controller.export_history(&mut output).await.unwrap();
    let csv = String::from_utf8(output).unwrap();

    assert!(csv.starts_with("key,kind,amount,status,tx_hash,created_at\n"));
    assert!(csv.contains("2,send,3,pending,0x"));
    assert!(csv.contains("1,approve,3,pending,0x"));

    h.controller.unmount().await;
    assert!(h.controller.history().await.is_empty());
}

#[tokio::test]
async fn test_send_step_failure_names_send() {
    let h = harness_with(RepeatingHashGateway {
        inner: stub_gateway(),
    });
    h.gateway.inner.mint(&user(), tokens(20));
    h.controller.connect(user()).await;

    let outcome = h.controller.deposit("10").await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed {
            kind: TxKind::Send,
            message: "Error sending".to_string(),
        }
    );
    assert_eq!(
        h.notifier.messages(),
        vec!["Approving...".to_string(), "Error sending".to_string()]
    );

    let history = h.controller.history().await;
    assert_eq!(history[0].kind, TxKind::Send);
    assert_eq!(history[0].status(), TxStatus::Failed);
    assert_eq!(history[1].status(), TxStatus::Pending);
}
