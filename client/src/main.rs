use anyhow::{format_err, Result};
use clap::Parser;
use colorful::{Color, Colorful};
use log::info;
use orange_staking::rewards::RewardCalculator;
use orange_staking::TOKEN_DECIMALS;
use serde_json::json;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::sync::Arc;

use staking_client::config::{load_cfg, ClientConfig, DEFAULT_CONFIG_PATH};
use staking_client::instructions::staking_instructions::*;
use staking_client::instructions::utils::{
    format_sol_amount, format_token_amount, parse_token_amount,
};
use staking_client::{
    ActivityEvent, ClientError, PollingSession, PoolClient, PoolStats, SessionState, Snapshot,
};

/// Decimals of a SOL amount typed in lamport-denominated commands.
const SOL_DECIMALS: u8 = 9;

fn read_keypair_file(s: &str) -> Result<Keypair> {
    solana_sdk::signature::read_keypair_file(s)
        .map_err(|_| format_err!("failed to read keypair from {}", s))
}

#[derive(Debug, Parser)]
pub struct Opts {
    /// INI file with the `[Global]` section.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,
    #[clap(subcommand)]
    pub command: StakingCommands,
}

#[derive(Debug, Parser)]
pub enum StakingCommands {
    /// Create the pool of the configured mint (admin).
    Initialize {
        #[arg(long)]
        reward_duration: i64,
        /// Token amount, e.g. `1000` or `0.5`.
        #[arg(long)]
        min_stake: String,
        /// Basis points.
        #[arg(long)]
        instant_unstake_fee: u16,
        #[arg(long)]
        dry_run: bool,
    },
    Stake {
        amount: String,
        #[arg(long)]
        dry_run: bool,
    },
    Unstake {
        amount: String,
        /// Skip the epoch wait and pay the instant unstake fee.
        #[arg(long)]
        instant: bool,
        #[arg(long)]
        dry_run: bool,
    },
    Claim {
        #[arg(long)]
        dry_run: bool,
    },
    /// Fund the reward vault (admin). Amount in SOL.
    DepositRewards {
        amount: String,
        #[arg(long)]
        dry_run: bool,
    },
    Snapshot {
        /// Defaults to the payer.
        #[arg(long)]
        user: Option<Pubkey>,
    },
    Stats,
    Activity {
        #[arg(long)]
        limit: Option<usize>,
    },
    Addresses {
        #[arg(long)]
        user: Option<Pubkey>,
    },
    /// Poll the pool until interrupted.
    Watch {
        #[arg(long)]
        user: Option<Pubkey>,
    },
}

fn heading(title: &str) -> String {
    title.color(Color::Green).bold().to_string()
}

fn print_instruction(ix: &Instruction, json_output: bool) {
    if json_output {
        let accounts: Vec<_> = ix
            .accounts
            .iter()
            .map(|meta| {
                json!({
                    "pubkey": meta.pubkey.to_string(),
                    "is_signer": meta.is_signer,
                    "is_writable": meta.is_writable,
                })
            })
            .collect();
        let value = json!({
            "program_id": ix.program_id.to_string(),
            "accounts": accounts,
            "data": hex::encode(&ix.data),
        });
        println!("{value}");
        return;
    }
    println!("{}", heading("instruction"));
    println!("program: {}", ix.program_id);
    for (i, meta) in ix.accounts.iter().enumerate() {
        let role = match (meta.is_signer, meta.is_writable) {
            (true, true) => "signer, writable",
            (true, false) => "signer",
            (false, true) => "writable",
            (false, false) => "readonly",
        };
        println!("  #{i:<2} {} ({role})", meta.pubkey);
    }
    println!("data: {}", hex::encode(&ix.data));
}

fn print_snapshot(owner: Option<&Pubkey>, snapshot: &Snapshot, json_output: bool) {
    let pool = &snapshot.pool;
    let stake = snapshot.user_stake.value();
    if json_output {
        let value = json!({
            "pool": {
                "authority": pool.authority.to_string(),
                "total_staked": pool.total_staked,
                "total_stakers": pool.total_stakers,
                "reward_duration": pool.reward_duration,
                "last_reward_time": pool.last_reward_time,
                "reward_per_token_stored": pool.reward_per_token_stored.to_string(),
                "min_stake_amount": pool.min_stake_amount,
                "instant_unstake_fee": pool.instant_unstake_fee,
            },
            "user": owner.map(|o| o.to_string()),
            "staked_amount": stake.map(|s| s.staked_amount),
            "total_rewards_claimed": stake.map(|s| s.total_rewards_claimed),
            "user_stake_defaulted": snapshot.user_stake.is_defaulted(),
            "token_balance": snapshot.token_balance.value(),
            "token_balance_defaulted": snapshot.token_balance.is_defaulted(),
            "pending_rewards": snapshot.pending_rewards,
        });
        println!("{value}");
        return;
    }
    println!("{}", heading("pool"));
    println!(
        "total staked:    {}",
        format_token_amount(pool.total_staked, TOKEN_DECIMALS)
    );
    println!("stakers:         {}", pool.total_stakers);
    println!(
        "minimum stake:   {}",
        format_token_amount(pool.min_stake_amount, TOKEN_DECIMALS)
    );
    println!("instant fee:     {} bps", pool.instant_unstake_fee);
    let Some(owner) = owner else {
        return;
    };
    println!("{}", heading(&format!("user {owner}")));
    let marker = |defaulted: bool| if defaulted { " (unavailable)" } else { "" };
    println!(
        "staked:          {}{}",
        format_token_amount(stake.map_or(0, |s| s.staked_amount), TOKEN_DECIMALS),
        marker(snapshot.user_stake.is_defaulted())
    );
    println!(
        "wallet balance:  {}{}",
        format_token_amount(snapshot.token_balance.value(), TOKEN_DECIMALS),
        marker(snapshot.token_balance.is_defaulted())
    );
    println!(
        "pending rewards: {} SOL",
        format_sol_amount(snapshot.pending_rewards)
    );
    println!(
        "claimed:         {} SOL",
        format_sol_amount(stake.map_or(0, |s| s.total_rewards_claimed))
    );
}

fn print_stats(stats: &PoolStats, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string(stats)?);
        return Ok(());
    }
    println!("{}", heading("pool stats"));
    println!(
        "total staked:  {}",
        format_token_amount(stats.total_staked, TOKEN_DECIMALS)
    );
    println!("stakers:       {}", stats.total_stakers);
    println!(
        "reward vault:  {} SOL",
        format_sol_amount(stats.reward_vault_balance)
    );
    println!("last deposit:  {}", stats.last_reward_time);
    Ok(())
}

fn print_activity(events: &[ActivityEvent], json_output: bool) {
    if json_output {
        let values: Vec<_> = events
            .iter()
            .map(|e| {
                json!({
                    "kind": e.kind.label(),
                    "actor": e.actor.map(|a| a.to_string()),
                    "timestamp": e.timestamp,
                    "signature": e.signature,
                    "amount": e.amount,
                })
            })
            .collect();
        println!("{}", json!(values));
        return;
    }
    println!("{}", heading("recent activity"));
    if events.is_empty() {
        println!("  none");
    }
    for e in events {
        let actor = e.actor.map_or_else(|| "unknown".to_string(), |a| a.to_string());
        let amount = match (e.kind, e.amount) {
            (staking_client::ActivityKind::Claim, Some(lamports)) => {
                format!(" {} SOL", format_sol_amount(lamports))
            }
            (_, Some(amount)) => format!(" {}", format_token_amount(amount, TOKEN_DECIMALS)),
            (_, None) => String::new(),
        };
        println!(
            "  {:>10} {:<8}{} by {} ({})",
            e.timestamp,
            e.kind.label(),
            amount,
            actor,
            e.signature
        );
    }
}

async fn send_or_print(
    client: &PoolClient<RpcClient>,
    ix: Instruction,
    payer: &Keypair,
    dry_run: bool,
    json_output: bool,
) -> Result<()> {
    if dry_run {
        print_instruction(&ix, json_output);
        return Ok(());
    }
    let signature = client.submit(&[ix], payer, &[]).await?;
    info!("confirmed {signature}");
    if json_output {
        println!("{}", json!({ "signature": signature.to_string() }));
    } else {
        println!("{}", signature);
    }
    Ok(())
}

async fn watch(
    client: PoolClient<RpcClient>,
    config: &ClientConfig,
    user: Option<Pubkey>,
    json_output: bool,
) -> Result<()> {
    let mut session = PollingSession::new(
        Arc::new(client),
        user,
        config.poll_interval,
        config.activity_limit,
    );
    let mut updates = session.subscribe();
    session.start();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                match state {
                    SessionState::Idle => {}
                    SessionState::Ready(view) => {
                        print_snapshot(user.as_ref(), &view.snapshot, json_output);
                        print_activity(&view.activity, json_output);
                    }
                    SessionState::NotInitialized => println!("pool is not initialized yet"),
                    SessionState::Failed(err) => {
                        let hint = if err.is_retryable() { ", retrying" } else { "" };
                        let line = format!("refresh failed: {err}{hint}");
                        println!("{}", line.as_str().color(Color::Red));
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    session.stop();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    solana_logger::setup_with_default("info");
    let opts = Opts::parse();
    let pool_config = load_cfg(&opts.config)?;
    let json_output = opts.json;

    let rpc_client =
        RpcClient::new_with_commitment(pool_config.http_url.clone(), pool_config.commitment);
    let client = PoolClient::new(
        rpc_client,
        &pool_config.stake_mint,
        &pool_config.orange_staking_program,
    )?;
    let addresses = *client.addresses();

    match opts.command {
        StakingCommands::Initialize {
            reward_duration,
            min_stake,
            instant_unstake_fee,
            dry_run,
        } => {
            let admin = read_keypair_file(&pool_config.admin_path)?;
            let min_stake_amount = parse_token_amount(&min_stake, TOKEN_DECIMALS)?;
            let ix = initialize_instr(
                &addresses,
                &admin.pubkey(),
                reward_duration,
                min_stake_amount,
                instant_unstake_fee,
            );
            send_or_print(&client, ix, &admin, dry_run, json_output).await?;
        }
        StakingCommands::Stake { amount, dry_run } => {
            let payer = read_keypair_file(&pool_config.payer_path)?;
            let amount = parse_token_amount(&amount, TOKEN_DECIMALS)?;
            if !dry_run {
                let pool = client.fetch_pool().await?;
                RewardCalculator::check_stake(&pool, amount).map_err(ClientError::from)?;
            }
            let ix = stake_instr(&addresses, &payer.pubkey(), amount)?;
            send_or_print(&client, ix, &payer, dry_run, json_output).await?;
        }
        StakingCommands::Unstake {
            amount,
            instant,
            dry_run,
        } => {
            let payer = read_keypair_file(&pool_config.payer_path)?;
            let amount = parse_token_amount(&amount, TOKEN_DECIMALS)?;
            if !dry_run {
                let snapshot = client.snapshot(Some(&payer.pubkey())).await?;
                let stake = snapshot.user_stake.value().unwrap_or_default();
                RewardCalculator::check_unstake(&stake, amount).map_err(ClientError::from)?;
                if instant {
                    let quote = RewardCalculator::instant_unstake_quote(
                        amount,
                        snapshot.pool.instant_unstake_fee,
                    )
                    .ok_or_else(|| format_err!("instant unstake fee exceeds the amount"))?;
                    info!(
                        "instant unstake fee {}, receiving {}",
                        format_token_amount(quote.fee, TOKEN_DECIMALS),
                        format_token_amount(quote.received, TOKEN_DECIMALS)
                    );
                }
            }
            let ix = if instant {
                instant_unstake_instr(&addresses, &payer.pubkey(), amount)?
            } else {
                unstake_instr(&addresses, &payer.pubkey(), amount)?
            };
            send_or_print(&client, ix, &payer, dry_run, json_output).await?;
        }
        StakingCommands::Claim { dry_run } => {
            let payer = read_keypair_file(&pool_config.payer_path)?;
            if !dry_run {
                let snapshot = client.snapshot(Some(&payer.pubkey())).await?;
                let stake = snapshot.user_stake.value().unwrap_or_default();
                let rewards = RewardCalculator::check_claim(&snapshot.pool, &stake)
                    .map_err(ClientError::from)?;
                info!("claiming {} SOL", format_sol_amount(rewards));
            }
            let ix = claim_rewards_instr(&addresses, &payer.pubkey())?;
            send_or_print(&client, ix, &payer, dry_run, json_output).await?;
        }
        StakingCommands::DepositRewards { amount, dry_run } => {
            let admin = read_keypair_file(&pool_config.admin_path)?;
            let lamports = parse_token_amount(&amount, SOL_DECIMALS)?;
            if !dry_run {
                let pool = client.fetch_pool().await?;
                RewardCalculator::check_deposit(&pool, &admin.pubkey())
                    .map_err(ClientError::from)?;
            }
            let ix = deposit_rewards_instr(&addresses, &admin.pubkey(), lamports);
            send_or_print(&client, ix, &admin, dry_run, json_output).await?;
        }
        StakingCommands::Snapshot { user } => {
            let owner = match user {
                Some(user) => user,
                None => read_keypair_file(&pool_config.payer_path)?.pubkey(),
            };
            match client.snapshot(Some(&owner)).await {
                Ok(snapshot) => print_snapshot(Some(&owner), &snapshot, json_output),
                Err(err) if err.is_empty_state() => println!("pool is not initialized yet"),
                Err(err) => return Err(err.into()),
            }
        }
        StakingCommands::Stats => {
            let stats = client.pool_stats().await?;
            print_stats(&stats, json_output)?;
        }
        StakingCommands::Activity { limit } => {
            let events = client
                .recent_activity(limit.unwrap_or(pool_config.activity_limit))
                .await?;
            print_activity(&events, json_output);
        }
        StakingCommands::Addresses { user } => {
            let user_stake = user.map(|u| addresses.user_stake(&u)).transpose()?;
            if json_output {
                let value = json!({
                    "program_id": addresses.program_id.to_string(),
                    "stake_mint": addresses.stake_mint.to_string(),
                    "pool": addresses.pool.to_string(),
                    "pool_bump": addresses.pool_bump,
                    "stake_vault": addresses.stake_vault.to_string(),
                    "reward_vault": addresses.reward_vault.to_string(),
                    "user_stake": user_stake.map(|k| k.to_string()),
                    "user_token_account":
                        user.map(|u| addresses.user_token_account(&u).to_string()),
                });
                println!("{value}");
            } else {
                println!("{}", heading("addresses"));
                println!("program:      {}", addresses.program_id);
                println!("stake mint:   {}", addresses.stake_mint);
                println!("pool:         {} (bump {})", addresses.pool, addresses.pool_bump);
                println!("stake vault:  {}", addresses.stake_vault);
                println!("reward vault: {}", addresses.reward_vault);
                if let (Some(user), Some(user_stake)) = (user, user_stake) {
                    println!("user stake:   {}", user_stake);
                    println!("user tokens:  {}", addresses.user_token_account(&user));
                }
            }
        }
        StakingCommands::Watch { user } => {
            watch(client, &pool_config, user, json_output).await?;
        }
    }
    Ok(())
}
