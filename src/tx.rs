// src/tx.rs
//
// Transaction building for the classic ledger protocol: assets, 7-decimal
// fixed-point amounts, rational prices, the operation set, and signed
// envelope assembly. Built once, signed once, submitted once.

use crate::keys::{decode_public_key, Keypair};
use crate::models::AccountSnapshot;
use crate::xdr::XdrWriter;
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Base fee per operation, in jots.
pub const BASE_FEE: u32 = 100;

/// One whole unit expressed in jots (seven decimal places).
pub const JOTS_PER_UNIT: i64 = 10_000_000;

/// Payments can route through at most this many intermediate assets.
pub const MAX_PATH_LENGTH: usize = 5;

const ENVELOPE_TYPE_TX: u32 = 2;

const OP_PAYMENT: u32 = 1;
const OP_PATH_PAYMENT_STRICT_RECEIVE: u32 = 2;
const OP_MANAGE_SELL_OFFER: u32 = 3;
const OP_CHANGE_TRUST: u32 = 6;
const OP_MANAGE_BUY_OFFER: u32 = 12;
const OP_PATH_PAYMENT_STRICT_SEND: u32 = 13;
const OP_LIQUIDITY_POOL_DEPOSIT: u32 = 22;
const OP_LIQUIDITY_POOL_WITHDRAW: u32 = 23;

// =============================================================================
// Assets
// =============================================================================

/// A ledger asset: the native token, or a (code, issuer) credit pair.
/// Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Asset {
    Native,
    Credit { code: String, issuer: String },
}

impl Asset {
    pub fn native() -> Self {
        Asset::Native
    }

    /// Creates a credit asset. Codes are 1-12 alphanumeric characters; codes
    /// of up to 4 characters use the short wire form, longer ones the long
    /// form.
    pub fn new(code: &str, issuer: &str) -> Result<Self, String> {
        if code.is_empty() || code.len() > 12 {
            return Err(format!("asset code must be 1-12 characters, got {:?}", code));
        }
        if !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(format!("asset code must be alphanumeric, got {:?}", code));
        }
        decode_public_key(issuer).map_err(|e| format!("bad asset issuer: {}", e))?;
        Ok(Asset::Credit {
            code: code.to_string(),
            issuer: issuer.to_string(),
        })
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    fn encode(&self, w: &mut XdrWriter) -> Result<(), String> {
        match self {
            Asset::Native => w.put_u32(0),
            Asset::Credit { code, issuer } => {
                let issuer_key = decode_public_key(issuer)?;
                if code.len() <= 4 {
                    w.put_u32(1);
                    let mut padded = [0u8; 4];
                    padded[..code.len()].copy_from_slice(code.as_bytes());
                    w.put_opaque_fixed(&padded);
                } else {
                    w.put_u32(2);
                    let mut padded = [0u8; 12];
                    padded[..code.len()].copy_from_slice(code.as_bytes());
                    w.put_opaque_fixed(&padded);
                }
                encode_account_id(w, &issuer_key);
            }
        }
        Ok(())
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Credit { code, issuer } => write!(f, "{}:{}", code, issuer),
        }
    }
}

// AccountID and the ed25519 arm of MuxedAccount share the same wire form:
// key-type discriminant zero, then the raw key.
fn encode_account_id(w: &mut XdrWriter, key: &[u8; 32]) {
    w.put_u32(0);
    w.put_opaque_fixed(key);
}

// =============================================================================
// Amounts and prices
// =============================================================================

/// Parses a decimal amount string into jots. Amounts are non-negative and
/// carry at most seven decimal places.
pub fn parse_amount(s: &str) -> Result<i64, String> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty()
        || !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(format!("malformed amount {:?}", s));
    }
    if frac_part.len() > 7 {
        return Err(format!("amount {:?} has more than 7 decimal places", s));
    }
    let whole: i64 = int_part
        .parse()
        .map_err(|_| format!("amount {:?} out of range", s))?;
    let mut frac: i64 = 0;
    if !frac_part.is_empty() {
        frac = frac_part
            .parse::<i64>()
            .map_err(|_| format!("malformed amount {:?}", s))?;
        frac *= 10_i64.pow((7 - frac_part.len()) as u32);
    }
    whole
        .checked_mul(JOTS_PER_UNIT)
        .and_then(|jots| jots.checked_add(frac))
        .ok_or_else(|| format!("amount {:?} out of range", s))
}

/// Renders jots back to a decimal string, trimming trailing zeros.
pub fn format_amount(jots: i64) -> String {
    let whole = jots / JOTS_PER_UNIT;
    let frac = jots % JOTS_PER_UNIT;
    if frac == 0 {
        whole.to_string()
    } else {
        let s = format!("{}.{:07}", whole, frac);
        s.trim_end_matches('0').to_string()
    }
}

/// An offer price as a reduced int32 ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}

impl Price {
    /// Parses a decimal price string into a reduced rational, so "0.5"
    /// becomes exactly 1/2.
    pub fn parse(s: &str) -> Result<Price, String> {
        let jots = parse_amount(s)?;
        if jots == 0 {
            return Err(format!("price must be positive: {:?}", s));
        }
        let g = gcd(jots, JOTS_PER_UNIT);
        let n = jots / g;
        let d = JOTS_PER_UNIT / g;
        if n > i32::MAX as i64 {
            return Err(format!("price {:?} does not fit an int32 ratio", s));
        }
        Ok(Price {
            n: n as i32,
            d: d as i32,
        })
    }

    fn encode(&self, w: &mut XdrWriter) {
        w.put_i32(self.n);
        w.put_i32(self.d);
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.n, self.d)
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Parses a 64-char hex liquidity pool id.
pub fn parse_pool_id(s: &str) -> Result<[u8; 32], String> {
    let bytes = hex::decode(s).map_err(|e| format!("pool id is not hex: {}", e))?;
    if bytes.len() != 32 {
        return Err(format!("pool id must be 32 bytes, got {}", bytes.len()));
    }
    let mut id = [0u8; 32];
    id.copy_from_slice(&bytes);
    Ok(id)
}

// =============================================================================
// Operations
// =============================================================================

/// One ledger operation. Constructed through the checked builders below,
/// which parse amounts and validate addresses up front.
#[derive(Clone, Debug)]
pub enum Operation {
    Payment {
        destination: String,
        asset: Asset,
        amount: i64,
    },
    ChangeTrust {
        asset: Asset,
        limit: i64,
    },
    ManageSellOffer {
        selling: Asset,
        buying: Asset,
        amount: i64,
        price: Price,
        offer_id: i64,
    },
    ManageBuyOffer {
        selling: Asset,
        buying: Asset,
        buy_amount: i64,
        price: Price,
        offer_id: i64,
    },
    PathPaymentStrictSend {
        send_asset: Asset,
        send_amount: i64,
        destination: String,
        dest_asset: Asset,
        dest_min: i64,
        path: Vec<Asset>,
    },
    PathPaymentStrictReceive {
        send_asset: Asset,
        send_max: i64,
        destination: String,
        dest_asset: Asset,
        dest_amount: i64,
        path: Vec<Asset>,
    },
    LiquidityPoolDeposit {
        pool_id: [u8; 32],
        max_amount_a: i64,
        max_amount_b: i64,
        min_price: Price,
        max_price: Price,
    },
    LiquidityPoolWithdraw {
        pool_id: [u8; 32],
        amount: i64,
        min_amount_a: i64,
        min_amount_b: i64,
    },
}

impl Operation {
    /// Simple payment of `amount` of `asset` to `destination`.
    pub fn payment(destination: &str, asset: Asset, amount: &str) -> Result<Operation, String> {
        decode_public_key(destination).map_err(|e| format!("bad payment destination: {}", e))?;
        Ok(Operation::Payment {
            destination: destination.to_string(),
            asset,
            amount: parse_amount(amount)?,
        })
    }

    /// Authorizes the source account to hold `asset` up to `limit`.
    pub fn change_trust(asset: Asset, limit: &str) -> Result<Operation, String> {
        if asset.is_native() {
            return Err("trustlines apply to credit assets only".to_string());
        }
        Ok(Operation::ChangeTrust {
            asset,
            limit: parse_amount(limit)?,
        })
    }

    /// Posts (or with a nonzero `offer_id`, amends) a sell order.
    pub fn manage_sell_offer(
        selling: Asset,
        buying: Asset,
        amount: &str,
        price: &str,
        offer_id: i64,
    ) -> Result<Operation, String> {
        Ok(Operation::ManageSellOffer {
            selling,
            buying,
            amount: parse_amount(amount)?,
            price: Price::parse(price)?,
            offer_id,
        })
    }

    /// Posts (or amends) a buy order denominated in the bought asset.
    pub fn manage_buy_offer(
        selling: Asset,
        buying: Asset,
        buy_amount: &str,
        price: &str,
        offer_id: i64,
    ) -> Result<Operation, String> {
        Ok(Operation::ManageBuyOffer {
            selling,
            buying,
            buy_amount: parse_amount(buy_amount)?,
            price: Price::parse(price)?,
            offer_id,
        })
    }

    /// Sends exactly `send_amount`, delivering at least `dest_min` of
    /// `dest_asset` through the given conversion path.
    pub fn path_payment_strict_send(
        send_asset: Asset,
        send_amount: &str,
        destination: &str,
        dest_asset: Asset,
        dest_min: &str,
        path: Vec<Asset>,
    ) -> Result<Operation, String> {
        decode_public_key(destination).map_err(|e| format!("bad payment destination: {}", e))?;
        if path.len() > MAX_PATH_LENGTH {
            return Err(format!("payment path is limited to {} hops", MAX_PATH_LENGTH));
        }
        Ok(Operation::PathPaymentStrictSend {
            send_asset,
            send_amount: parse_amount(send_amount)?,
            destination: destination.to_string(),
            dest_asset,
            dest_min: parse_amount(dest_min)?,
            path,
        })
    }

    /// Delivers exactly `dest_amount`, spending at most `send_max` of
    /// `send_asset` through the given conversion path.
    pub fn path_payment_strict_receive(
        send_asset: Asset,
        send_max: &str,
        destination: &str,
        dest_asset: Asset,
        dest_amount: &str,
        path: Vec<Asset>,
    ) -> Result<Operation, String> {
        decode_public_key(destination).map_err(|e| format!("bad payment destination: {}", e))?;
        if path.len() > MAX_PATH_LENGTH {
            return Err(format!("payment path is limited to {} hops", MAX_PATH_LENGTH));
        }
        Ok(Operation::PathPaymentStrictReceive {
            send_asset,
            send_max: parse_amount(send_max)?,
            destination: destination.to_string(),
            dest_asset,
            dest_amount: parse_amount(dest_amount)?,
            path,
        })
    }

    /// Deposits up to the given amounts of both pool assets, bounded by the
    /// accepted price range.
    pub fn liquidity_pool_deposit(
        pool_id: &str,
        max_amount_a: &str,
        max_amount_b: &str,
        min_price: &str,
        max_price: &str,
    ) -> Result<Operation, String> {
        Ok(Operation::LiquidityPoolDeposit {
            pool_id: parse_pool_id(pool_id)?,
            max_amount_a: parse_amount(max_amount_a)?,
            max_amount_b: parse_amount(max_amount_b)?,
            min_price: Price::parse(min_price)?,
            max_price: Price::parse(max_price)?,
        })
    }

    /// Burns `amount` pool shares for at least the given amounts of the two
    /// pool assets.
    pub fn liquidity_pool_withdraw(
        pool_id: &str,
        amount: &str,
        min_amount_a: &str,
        min_amount_b: &str,
    ) -> Result<Operation, String> {
        Ok(Operation::LiquidityPoolWithdraw {
            pool_id: parse_pool_id(pool_id)?,
            amount: parse_amount(amount)?,
            min_amount_a: parse_amount(min_amount_a)?,
            min_amount_b: parse_amount(min_amount_b)?,
        })
    }

    fn encode(&self, w: &mut XdrWriter) -> Result<(), String> {
        // no per-operation source account override
        w.put_bool(false);
        match self {
            Operation::Payment {
                destination,
                asset,
                amount,
            } => {
                w.put_u32(OP_PAYMENT);
                encode_account_id(w, &decode_public_key(destination)?);
                asset.encode(w)?;
                w.put_i64(*amount);
            }
            Operation::ChangeTrust { asset, limit } => {
                w.put_u32(OP_CHANGE_TRUST);
                asset.encode(w)?;
                w.put_i64(*limit);
            }
            Operation::ManageSellOffer {
                selling,
                buying,
                amount,
                price,
                offer_id,
            } => {
                w.put_u32(OP_MANAGE_SELL_OFFER);
                selling.encode(w)?;
                buying.encode(w)?;
                w.put_i64(*amount);
                price.encode(w);
                w.put_i64(*offer_id);
            }
            Operation::ManageBuyOffer {
                selling,
                buying,
                buy_amount,
                price,
                offer_id,
            } => {
                w.put_u32(OP_MANAGE_BUY_OFFER);
                selling.encode(w)?;
                buying.encode(w)?;
                w.put_i64(*buy_amount);
                price.encode(w);
                w.put_i64(*offer_id);
            }
            Operation::PathPaymentStrictSend {
                send_asset,
                send_amount,
                destination,
                dest_asset,
                dest_min,
                path,
            } => {
                w.put_u32(OP_PATH_PAYMENT_STRICT_SEND);
                send_asset.encode(w)?;
                w.put_i64(*send_amount);
                encode_account_id(w, &decode_public_key(destination)?);
                dest_asset.encode(w)?;
                w.put_i64(*dest_min);
                w.put_u32(path.len() as u32);
                for hop in path {
                    hop.encode(w)?;
                }
            }
            Operation::PathPaymentStrictReceive {
                send_asset,
                send_max,
                destination,
                dest_asset,
                dest_amount,
                path,
            } => {
                w.put_u32(OP_PATH_PAYMENT_STRICT_RECEIVE);
                send_asset.encode(w)?;
                w.put_i64(*send_max);
                encode_account_id(w, &decode_public_key(destination)?);
                dest_asset.encode(w)?;
                w.put_i64(*dest_amount);
                w.put_u32(path.len() as u32);
                for hop in path {
                    hop.encode(w)?;
                }
            }
            Operation::LiquidityPoolDeposit {
                pool_id,
                max_amount_a,
                max_amount_b,
                min_price,
                max_price,
            } => {
                w.put_u32(OP_LIQUIDITY_POOL_DEPOSIT);
                w.put_opaque_fixed(pool_id);
                w.put_i64(*max_amount_a);
                w.put_i64(*max_amount_b);
                min_price.encode(w);
                max_price.encode(w);
            }
            Operation::LiquidityPoolWithdraw {
                pool_id,
                amount,
                min_amount_a,
                min_amount_b,
            } => {
                w.put_u32(OP_LIQUIDITY_POOL_WITHDRAW);
                w.put_opaque_fixed(pool_id);
                w.put_i64(*amount);
                w.put_i64(*min_amount_a);
                w.put_i64(*min_amount_b);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Transaction builder
// =============================================================================

pub fn network_id(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

/// Assembles a transaction from a freshly loaded account snapshot.
pub struct TransactionBuilder {
    source_account: String,
    sequence: i64,
    base_fee: u32,
    network_passphrase: String,
    timeout_secs: u64,
    operations: Vec<Operation>,
}

impl TransactionBuilder {
    pub fn new(snapshot: &AccountSnapshot, network_passphrase: &str) -> Self {
        TransactionBuilder {
            source_account: snapshot.account_id.clone(),
            sequence: snapshot.sequence,
            base_fee: BASE_FEE,
            network_passphrase: network_passphrase.to_string(),
            timeout_secs: 100,
            operations: Vec::new(),
        }
    }

    pub fn add_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Submission deadline relative to now, mirrored into the time bounds.
    pub fn set_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<Transaction, String> {
        if self.operations.is_empty() {
            return Err("transaction requires at least one operation".to_string());
        }
        let source = decode_public_key(&self.source_account)
            .map_err(|e| format!("bad source account: {}", e))?;
        let sequence = self
            .sequence
            .checked_add(1)
            .ok_or_else(|| "sequence number overflow".to_string())?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        Ok(Transaction {
            source,
            fee: self.base_fee * self.operations.len() as u32,
            sequence,
            min_time: 0,
            max_time: now + self.timeout_secs,
            operations: self.operations,
            network_id: network_id(&self.network_passphrase),
        })
    }
}

/// A built, not-yet-signed transaction.
pub struct Transaction {
    source: [u8; 32],
    fee: u32,
    sequence: i64,
    min_time: u64,
    max_time: u64,
    operations: Vec<Operation>,
    network_id: [u8; 32],
}

impl Transaction {
    fn encode(&self) -> Result<Vec<u8>, String> {
        let mut w = XdrWriter::new();
        encode_account_id(&mut w, &self.source);
        w.put_u32(self.fee);
        w.put_i64(self.sequence);
        // time bounds present
        w.put_bool(true);
        w.put_u64(self.min_time);
        w.put_u64(self.max_time);
        // memo: none
        w.put_u32(0);
        w.put_u32(self.operations.len() as u32);
        for op in &self.operations {
            op.encode(&mut w)?;
        }
        // reserved extension point
        w.put_u32(0);
        Ok(w.into_bytes())
    }

    /// The byte string that is actually signed: network id, envelope
    /// discriminant, then the transaction body.
    pub fn signature_base(&self) -> Result<Vec<u8>, String> {
        let mut w = XdrWriter::new();
        w.put_opaque_fixed(&self.network_id);
        w.put_u32(ENVELOPE_TYPE_TX);
        w.put_raw(&self.encode()?);
        Ok(w.into_bytes())
    }

    /// Network-scoped transaction hash, as reported back by the ledger.
    pub fn hash(&self) -> Result<[u8; 32], String> {
        Ok(Sha256::digest(&self.signature_base()?).into())
    }

    /// Signs the transaction hash, producing a submittable envelope.
    pub fn sign(self, keypair: &Keypair) -> Result<SignedTransaction, String> {
        let hash = self.hash()?;
        let signature = keypair.sign(&hash);
        Ok(SignedTransaction {
            tx: self,
            signatures: vec![DecoratedSignature {
                hint: keypair.hint(),
                signature,
            }],
        })
    }
}

pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: [u8; 64],
}

/// A signed transaction ready for submission.
pub struct SignedTransaction {
    tx: Transaction,
    signatures: Vec<DecoratedSignature>,
}

impl SignedTransaction {
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// Base64 envelope in the form POST /transactions expects.
    pub fn to_envelope_base64(&self) -> Result<String, String> {
        let mut w = XdrWriter::new();
        w.put_u32(ENVELOPE_TYPE_TX);
        w.put_raw(&self.tx.encode()?);
        w.put_u32(self.signatures.len() as u32);
        for sig in &self.signatures {
            w.put_opaque_fixed(&sig.hint);
            w.put_opaque(&sig.signature);
        }
        Ok(base64::encode(w.into_bytes()))
    }

    /// Hex transaction hash, for logs.
    pub fn hash_hex(&self) -> Result<String, String> {
        Ok(hex::encode(self.tx.hash()?))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{PublicKey, Signature, Verifier};

    fn snapshot_for(kp: &Keypair, sequence: i64) -> AccountSnapshot {
        AccountSnapshot {
            account_id: kp.public_key(),
            sequence,
            balances: Vec::new(),
        }
    }

    #[test]
    fn test_parse_amount_whole_units() {
        assert_eq!(parse_amount("500").unwrap(), 5_000_000_000);
        assert_eq!(parse_amount("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_amount_fractional() {
        assert_eq!(parse_amount("0.5").unwrap(), 5_000_000);
        assert_eq!(parse_amount("1.0000001").unwrap(), 10_000_001);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("1.00000001").is_err()); // 8 decimal places
        assert!(parse_amount("99999999999999999999").is_err()); // overflow
    }

    #[test]
    fn test_format_amount_trims_zeros() {
        assert_eq!(format_amount(5_000_000_000), "500");
        assert_eq!(format_amount(5_000_000), "0.5");
        assert_eq!(format_amount(10_000_001), "1.0000001");
    }

    #[test]
    fn test_price_reduces_exactly() {
        assert_eq!(Price::parse("0.5").unwrap(), Price { n: 1, d: 2 });
        assert_eq!(Price::parse("2").unwrap(), Price { n: 2, d: 1 });
        assert_eq!(Price::parse("1.25").unwrap(), Price { n: 5, d: 4 });
    }

    #[test]
    fn test_price_rejects_zero() {
        assert!(Price::parse("0").is_err());
        assert!(Price::parse("0.0").is_err());
    }

    #[test]
    fn test_native_asset_encoding() {
        let mut w = XdrWriter::new();
        Asset::native().encode(&mut w).unwrap();
        assert_eq!(w.into_bytes(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_short_code_asset_encoding() {
        let issuer = Keypair::random();
        let asset = Asset::new("USD", &issuer.public_key()).unwrap();
        let mut w = XdrWriter::new();
        asset.encode(&mut w).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 4 + 4 + 4 + 32);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 1]);
        assert_eq!(&bytes[4..8], b"USD\0");
        assert_eq!(&bytes[8..12], &[0, 0, 0, 0]);
        assert_eq!(&bytes[12..44], &issuer.public_bytes());
    }

    #[test]
    fn test_long_code_asset_encoding() {
        let issuer = Keypair::random();
        let asset = Asset::new("TradeToken", &issuer.public_key()).unwrap();
        let mut w = XdrWriter::new();
        asset.encode(&mut w).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 4 + 12 + 4 + 32);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 2]);
        assert_eq!(&bytes[4..16], b"TradeToken\0\0");
        assert_eq!(&bytes[20..52], &issuer.public_bytes());
    }

    #[test]
    fn test_asset_rejects_bad_codes() {
        let issuer = Keypair::random().public_key();
        assert!(Asset::new("", &issuer).is_err());
        assert!(Asset::new("THIRTEENCHARS", &issuer).is_err());
        assert!(Asset::new("bad-code", &issuer).is_err());
        assert!(Asset::new("USD", "GNOTAKEY").is_err());
    }

    #[test]
    fn test_change_trust_requires_credit_asset() {
        assert!(Operation::change_trust(Asset::native(), "1000").is_err());
    }

    #[test]
    fn test_path_length_is_capped() {
        let issuer = Keypair::random();
        let token = Asset::new("TOK", &issuer.public_key()).unwrap();
        let path = vec![Asset::native(); 6];
        let result = Operation::path_payment_strict_send(
            Asset::native(),
            "10",
            &issuer.public_key(),
            token,
            "5",
            path,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_build_rejects_empty_transaction() {
        let kp = Keypair::random();
        let result = TransactionBuilder::new(&snapshot_for(&kp, 7), "Test Network").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_envelope_layout_and_signature() {
        let source = Keypair::random();
        let destination = Keypair::random();
        let token = Asset::new("TOK", &source.public_key()).unwrap();
        let op = Operation::payment(&destination.public_key(), token, "500").unwrap();

        let tx = TransactionBuilder::new(&snapshot_for(&source, 41), "Test Network")
            .add_operation(op)
            .set_timeout(100)
            .build()
            .unwrap();
        let signed = tx.sign(&source).unwrap();
        let envelope = base64::decode(signed.to_envelope_base64().unwrap()).unwrap();

        // envelope discriminant, then the ed25519 source account
        assert_eq!(&envelope[0..4], &[0, 0, 0, 2]);
        assert_eq!(&envelope[4..8], &[0, 0, 0, 0]);
        assert_eq!(&envelope[8..40], &source.public_bytes());
        // fee for one operation
        assert_eq!(&envelope[40..44], &100u32.to_be_bytes());
        // sequence is snapshot + 1
        assert_eq!(&envelope[44..52], &42i64.to_be_bytes());
        // time bounds present, min_time zero
        assert_eq!(&envelope[52..56], &[0, 0, 0, 1]);
        assert_eq!(&envelope[56..64], &0u64.to_be_bytes());

        // exactly one decorated signature, hinted with the key tail
        let hint_offset = envelope.len() - 72;
        assert_eq!(&envelope[hint_offset..hint_offset + 4], &source.hint());
        assert_eq!(
            &envelope[hint_offset + 4..hint_offset + 8],
            &64u32.to_be_bytes()
        );

        // the signature covers the network-scoped transaction hash
        let signature = Signature::from_bytes(&envelope[envelope.len() - 64..]).unwrap();
        let public = PublicKey::from_bytes(&source.public_bytes()).unwrap();
        let hash = signed.transaction().hash().unwrap();
        assert!(public.verify(&hash, &signature).is_ok());
    }

    #[test]
    fn test_hash_depends_on_network_passphrase() {
        let source = Keypair::random();
        let destination = Keypair::random();
        let token = Asset::new("TOK", &source.public_key()).unwrap();
        let op = Operation::payment(&destination.public_key(), token, "1").unwrap();

        let on_testnet = TransactionBuilder::new(&snapshot_for(&source, 5), "Network A")
            .add_operation(op.clone())
            .build()
            .unwrap();
        let on_mainnet = TransactionBuilder::new(&snapshot_for(&source, 5), "Network B")
            .add_operation(op)
            .build()
            .unwrap();
        assert_ne!(on_testnet.hash().unwrap(), on_mainnet.hash().unwrap());
    }

    #[test]
    fn test_fee_scales_with_operation_count() {
        let source = Keypair::random();
        let destination = Keypair::random();
        let token = Asset::new("TOK", &source.public_key()).unwrap();
        let op = Operation::payment(&destination.public_key(), token, "1").unwrap();

        let tx = TransactionBuilder::new(&snapshot_for(&source, 5), "Test Network")
            .add_operation(op.clone())
            .add_operation(op)
            .build()
            .unwrap();
        let signed = tx.sign(&source).unwrap();
        let envelope = base64::decode(signed.to_envelope_base64().unwrap()).unwrap();
        assert_eq!(&envelope[40..44], &200u32.to_be_bytes());
    }

    #[test]
    fn test_pool_id_parsing() {
        let id = "a".repeat(64);
        assert!(parse_pool_id(&id).is_ok());
        assert!(parse_pool_id("abcd").is_err());
        assert!(parse_pool_id(&"z".repeat(64)).is_err());
    }
}
