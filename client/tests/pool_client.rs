mod common;

use common::{addresses, client_with_pool, pool_with_index, position, MockRpc};
use orange_staking::error::ErrorCode;
use orange_staking::states::UserStake;
use orange_staking::PRECISION;
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};
use staking_client::instructions::staking_instructions::claim_rewards_instr;
use staking_client::{ActivityKind, ClientError, Fetched, PoolClient, TransactionRecord};

#[tokio::test]
async fn missing_pool_is_empty_state() {
    let client = PoolClient::new(
        MockRpc::default(),
        &orange_staking::orange_mint::id(),
        &orange_staking::id(),
    )
    .unwrap();

    let err = client.snapshot(None).await.unwrap_err();
    assert!(err.is_empty_state());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn unreachable_pool_fails_the_snapshot() {
    let client = client_with_pool(&pool_with_index(0));
    client.rpc().set_unreachable(addresses().pool);

    let err = client.snapshot(Some(&Pubkey::new_unique())).await.unwrap_err();
    assert!(matches!(err, ClientError::TransportFailure(_)));
}

#[tokio::test]
async fn truncated_pool_is_malformed() {
    let client = client_with_pool(&pool_with_index(0));
    let mut data = pool_with_index(0).pack().to_vec();
    data.truncate(194);
    client.rpc().set_account(addresses().pool, data);

    let err = client.fetch_pool().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::MalformedAccount { account: "pool", .. }
    ));
}

#[tokio::test]
async fn snapshot_without_user_reads_only_the_pool() {
    let pool = pool_with_index(PRECISION);
    let client = client_with_pool(&pool);

    let snapshot = client.snapshot(None).await.unwrap();
    assert_eq!(snapshot.pool, pool);
    assert_eq!(snapshot.user_stake, Fetched::Loaded(None));
    assert_eq!(snapshot.pending_rewards, 0);
    assert_eq!(client.rpc().reads(), 1);
}

#[tokio::test]
async fn snapshot_accrues_pending_rewards() {
    let owner = Pubkey::new_unique();
    let client = client_with_pool(&pool_with_index(2 * PRECISION));
    let stake = position(owner, 1_000_000, PRECISION);
    client
        .rpc()
        .set_account(addresses().user_stake(&owner).unwrap(), stake.pack().to_vec());
    client
        .rpc()
        .token_balances
        .lock()
        .unwrap()
        .insert(addresses().user_token_account(&owner), 42_000_000);

    let snapshot = client.snapshot(Some(&owner)).await.unwrap();
    assert_eq!(snapshot.user_stake, Fetched::Loaded(Some(stake)));
    assert_eq!(snapshot.token_balance, Fetched::Loaded(42_000_000));
    assert_eq!(snapshot.pending_rewards, 1_000_000);
}

#[tokio::test]
async fn new_user_has_no_position() {
    let owner = Pubkey::new_unique();
    let client = client_with_pool(&pool_with_index(PRECISION));

    let snapshot = client.snapshot(Some(&owner)).await.unwrap();
    assert_eq!(snapshot.user_stake, Fetched::Loaded(None));
    assert_eq!(snapshot.token_balance, Fetched::Loaded(0));
    assert_eq!(snapshot.pending_rewards, 0);
}

#[tokio::test]
async fn unreachable_user_reads_are_defaulted() {
    let owner = Pubkey::new_unique();
    let client = client_with_pool(&pool_with_index(PRECISION));
    client
        .rpc()
        .set_unreachable(addresses().user_stake(&owner).unwrap());
    client
        .rpc()
        .set_unreachable(addresses().user_token_account(&owner));

    let snapshot = client.snapshot(Some(&owner)).await.unwrap();
    assert!(snapshot.user_stake.is_defaulted());
    assert!(snapshot.token_balance.is_defaulted());
    assert_eq!(snapshot.token_balance.value(), 0);
    assert_eq!(snapshot.pending_rewards, 0);
}

#[tokio::test]
async fn unreadable_token_account_is_defaulted() {
    let owner = Pubkey::new_unique();
    let client = client_with_pool(&pool_with_index(2 * PRECISION));
    let stake = position(owner, 1_000_000, PRECISION);
    client
        .rpc()
        .set_account(addresses().user_stake(&owner).unwrap(), stake.pack().to_vec());
    client
        .rpc()
        .garbled_token_accounts
        .lock()
        .unwrap()
        .insert(addresses().user_token_account(&owner));

    let snapshot = client.snapshot(Some(&owner)).await.unwrap();
    assert!(snapshot.token_balance.is_defaulted());
    assert_eq!(snapshot.user_stake, Fetched::Loaded(Some(stake)));
    assert_eq!(snapshot.pending_rewards, 1_000_000);
}

#[tokio::test]
async fn emptied_position_has_no_pending_rewards() {
    let owner = Pubkey::new_unique();
    let client = client_with_pool(&pool_with_index(2 * PRECISION));
    let stake = UserStake {
        pending_rewards: 777,
        ..position(owner, 0, PRECISION)
    };
    client
        .rpc()
        .set_account(addresses().user_stake(&owner).unwrap(), stake.pack().to_vec());

    let snapshot = client.snapshot(Some(&owner)).await.unwrap();
    assert_eq!(snapshot.user_stake, Fetched::Loaded(Some(stake)));
    assert_eq!(snapshot.pending_rewards, 0);
}

#[tokio::test]
async fn malformed_user_stake_aborts() {
    let owner = Pubkey::new_unique();
    let client = client_with_pool(&pool_with_index(PRECISION));
    client
        .rpc()
        .set_account(addresses().user_stake(&owner).unwrap(), vec![7u8; 40]);

    let err = client.snapshot(Some(&owner)).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::MalformedAccount {
            account: "user stake",
            ..
        }
    ));
}

#[tokio::test]
async fn checkpoint_ahead_of_pool_is_malformed() {
    let owner = Pubkey::new_unique();
    let client = client_with_pool(&pool_with_index(PRECISION));
    let stake = position(owner, 1_000_000, 2 * PRECISION);
    client
        .rpc()
        .set_account(addresses().user_stake(&owner).unwrap(), stake.pack().to_vec());

    let err = client.snapshot(Some(&owner)).await.unwrap_err();
    assert!(matches!(err, ClientError::MalformedAccount { .. }));
}

#[tokio::test]
async fn pool_stats_include_vault_balance() {
    let pool = pool_with_index(0);
    let client = client_with_pool(&pool);
    client
        .rpc()
        .balances
        .lock()
        .unwrap()
        .insert(addresses().reward_vault, 5_000_000_000);

    let stats = client.pool_stats().await.unwrap();
    assert_eq!(stats.total_staked, pool.total_staked);
    assert_eq!(stats.total_stakers, 1);
    assert_eq!(stats.reward_vault_balance, 5_000_000_000);
    assert_eq!(stats.instant_unstake_fee, 100);
}

#[tokio::test]
async fn recent_activity_over_reads_and_filters() {
    let client = client_with_pool(&pool_with_index(0));
    let marker = |name: &str| format!("Program log: Instruction: {name}");
    {
        let mut transactions = client.rpc().transactions.lock().unwrap();
        for (i, name) in ["Stake", "DepositRewards", "ClaimRewards", "Unstake"]
            .iter()
            .enumerate()
        {
            transactions.push(TransactionRecord {
                signature: format!("sig-{i}"),
                log_lines: vec![marker(name)],
                signer: Some(Pubkey::new_unique()),
                timestamp: 1_700_000_000 - i as i64,
                success: true,
            });
        }
    }

    let events = client.recent_activity(2).await.unwrap();
    assert_eq!(*client.rpc().requested_limits.lock().unwrap(), vec![4]);
    let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ActivityKind::Stake, ActivityKind::Claim]);
    assert_eq!(events[1].signature, "sig-2");
}

#[tokio::test]
async fn submit_surfaces_program_errors() {
    let client = client_with_pool(&pool_with_index(0));
    let user = Keypair::new();
    let instruction = claim_rewards_instr(client.addresses(), &user.pubkey()).unwrap();

    *client.rpc().reject_with.lock().unwrap() = Some(ErrorCode::NoRewardsToClaim.custom_code());
    let err = client.submit(&[instruction.clone()], &user, &[]).await.unwrap_err();
    assert!(matches!(
        err.program_error(),
        Some(ErrorCode::NoRewardsToClaim)
    ));

    *client.rpc().reject_with.lock().unwrap() = None;
    let signature = client.submit(&[instruction], &user, &[]).await.unwrap();
    let sent = client.rpc().sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].signatures[0], signature);
    assert_eq!(sent[0].message.account_keys[0], user.pubkey());
}
