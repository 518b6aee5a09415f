use log::{debug, warn};
use solana_client::{
    client_error::ClientError as RpcClientError, nonblocking::rpc_client::RpcClient,
    rpc_client::GetConfirmedSignaturesForAddress2Config, rpc_config::RpcTransactionConfig,
};
use solana_sdk::{
    hash::Hash,
    instruction::{Instruction, InstructionError},
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, TransactionError},
};
use solana_transaction_status::{
    option_serializer::OptionSerializer, EncodedConfirmedTransactionWithStatusMeta,
    UiTransactionEncoding,
};
use std::future::Future;
use std::str::FromStr;

use crate::activity::TransactionRecord;
use crate::error::{ClientError, Result};

/// Remote reads and transaction submission the staking client relies on.
///
/// Every read is independent and may run concurrently with any other.
pub trait StakingRpc: Send + Sync {
    /// Raw data of `address`, `None` if the account does not exist.
    fn get_account_data(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Balance of an SPL token account; a missing account holds zero.
    fn get_token_balance(&self, token_account: &Pubkey)
        -> impl Future<Output = Result<u64>> + Send;

    /// Lamports held by `address`.
    fn get_balance(&self, address: &Pubkey) -> impl Future<Output = Result<u64>> + Send;

    /// Up to `limit` transactions mentioning `address`, newest first.
    fn get_recent_transactions(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TransactionRecord>>> + Send;

    fn get_latest_blockhash(&self) -> impl Future<Output = Result<Hash>> + Send;

    fn send_and_confirm(
        &self,
        transaction: &Transaction,
    ) -> impl Future<Output = Result<Signature>> + Send;
}

/// Program errors become `ProgramRejected`, everything else is transport.
fn map_send_error(err: RpcClientError) -> ClientError {
    match err.get_transaction_error() {
        Some(TransactionError::InstructionError(_, InstructionError::Custom(code))) => {
            ClientError::rejected(code)
        }
        _ => ClientError::transport(err),
    }
}

fn transaction_record(
    signature: String,
    block_time: Option<i64>,
    tx: EncodedConfirmedTransactionWithStatusMeta,
) -> Option<TransactionRecord> {
    let meta = tx.transaction.meta?;
    let log_lines = match meta.log_messages {
        OptionSerializer::Some(lines) => lines,
        _ => Vec::new(),
    };
    let signer = tx
        .transaction
        .transaction
        .decode()
        .and_then(|decoded| decoded.message.static_account_keys().first().copied());
    Some(TransactionRecord {
        signature,
        log_lines,
        signer,
        timestamp: tx.block_time.or(block_time).unwrap_or_default(),
        success: meta.err.is_none(),
    })
}

impl StakingRpc for RpcClient {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        debug!("fetching account {address}");
        let response = self
            .get_account_with_commitment(address, self.commitment())
            .await
            .map_err(ClientError::transport)?;
        Ok(response.value.map(|account| account.data))
    }

    async fn get_token_balance(&self, token_account: &Pubkey) -> Result<u64> {
        let Some(data) = StakingRpc::get_account_data(self, token_account).await? else {
            return Ok(0);
        };
        spl_token::state::Account::unpack(&data)
            .map(|account| account.amount)
            .map_err(|e| ClientError::malformed("token", e))
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        debug!("fetching balance of {address}");
        self.get_balance_with_commitment(address, self.commitment())
            .await
            .map(|response| response.value)
            .map_err(ClientError::transport)
    }

    async fn get_recent_transactions(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>> {
        debug!("fetching {limit} signatures for {address}");
        let statuses = self
            .get_signatures_for_address_with_config(
                address,
                GetConfirmedSignaturesForAddress2Config {
                    limit: Some(limit),
                    commitment: Some(self.commitment()),
                    ..GetConfirmedSignaturesForAddress2Config::default()
                },
            )
            .await
            .map_err(ClientError::transport)?;

        let mut records = Vec::with_capacity(statuses.len());
        for status in statuses {
            let signature =
                Signature::from_str(&status.signature).map_err(ClientError::transport)?;
            let config = RpcTransactionConfig {
                encoding: Some(UiTransactionEncoding::Base64),
                commitment: Some(self.commitment()),
                max_supported_transaction_version: Some(0),
            };
            match self.get_transaction_with_config(&signature, config).await {
                Ok(tx) => {
                    records.extend(transaction_record(status.signature, status.block_time, tx))
                }
                Err(err) => warn!("skipping transaction {signature}: {err}"),
            }
        }
        Ok(records)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        RpcClient::get_latest_blockhash(self)
            .await
            .map_err(ClientError::transport)
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        self.send_and_confirm_transaction(transaction)
            .await
            .map_err(map_send_error)
    }
}

/// Signs `instructions` with `payer` and `signers` against a fresh blockhash
/// and sends them as one transaction.
pub async fn send_txn<R: StakingRpc>(
    rpc: &R,
    instructions: &[Instruction],
    payer: &Keypair,
    signers: &[&Keypair],
) -> Result<Signature> {
    let recent_hash = rpc.get_latest_blockhash().await?;
    let mut all_signers: Vec<&Keypair> = vec![payer];
    all_signers.extend(signers.iter().filter(|s| s.pubkey() != payer.pubkey()));
    let mut txn = Transaction::new_with_payer(instructions, Some(&payer.pubkey()));
    txn.try_sign(all_signers.as_slice(), recent_hash)
        .map_err(|e| ClientError::Config(format!("signing failed: {e}")))?;
    rpc.send_and_confirm(&txn).await
}
