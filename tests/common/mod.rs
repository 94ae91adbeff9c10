#![allow(dead_code)]

use async_trait::async_trait;
use ledger_vapory::{
    AddressResponse, BoxError, ConnectionFactory, DeviceError, LedgerVapory, Network,
    RawSignature, RecoveryAction, RecoveryHandler, RetryPolicy, VaporyApi,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, sleep};

pub const TEST_ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const TEST_PUBLIC_KEY: &str = "04e68acfc0253a10620dff706b0a1b1f1f5833ea3beb3bde2250d5f271f3563606672ebc45e0b7ea2e816ecb70ca03137b1c9476eec63d4632e990020b7b6fba39";
pub const SIG_R: &str = "6d2b4dbd8e8b0d7bcdc2b2e7a0df0b9d0b4f52b1b17c3b4b64ad8b0b6f2f8a11";
pub const SIG_S: &str = "1c43b6b6e4a0fd2cf2b7a9d3b0d9e44b0b1dcb0ef0bd6e16f2c0ba1fd2a5b4e7";
pub const SIG_V: &str = "1c";
pub const TEST_TRANSACTION: &str = "e8018504e3b292008252089428ee52a8f3d6e5d15f8b131996950d7f296c7952872bd72a2487400080";

/// Command the fake device received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetAddress(String),
    Sign { path: String, transaction: String },
}

/// Shared state observed by the tests and driven by the fake device
#[derive(Default)]
pub struct FakeDevice {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<VecDeque<DeviceError>>,
    raw_signature: Mutex<Option<RawSignature>>,
    stall: Mutex<Option<Duration>>,
    connects: AtomicUsize,
    fail_connect: AtomicBool,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeDevice {
    /// Queue failures returned by the next device commands, in order
    pub fn fail_with(&self, failures: impl IntoIterator<Item = DeviceError>) {
        self.failures.lock().unwrap().extend(failures);
    }

    pub fn fail_connect(&self) {
        self.fail_connect.store(true, Ordering::SeqCst);
    }

    pub fn respond_with_signature(&self, raw: RawSignature) {
        *self.raw_signature.lock().unwrap() = Some(raw);
    }

    /// Make the next device command take `duration` before answering
    pub fn stall_next(&self, duration: Duration) {
        *self.stall.lock().unwrap() = Some(duration);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Highest number of commands seen in flight at once
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    async fn exchange(&self, call: Call) -> Result<(), DeviceError> {
        let in_flight = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(in_flight, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);

        let stall = self.stall.lock().unwrap().take();
        sleep(stall.unwrap_or(Duration::from_millis(2))).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub struct FakeApi {
    device: Arc<FakeDevice>,
    mid_exchange: bool,
}

impl FakeApi {
    /// Refuses to start a command while an abandoned one is still pending
    async fn exchange(&mut self, call: Call) -> Result<(), DeviceError> {
        if self.mid_exchange {
            return Err(DeviceError::other("answer to an abandoned command still pending"));
        }
        self.mid_exchange = true;
        let result = self.device.exchange(call).await;
        self.mid_exchange = false;
        result
    }
}

#[async_trait]
impl VaporyApi for FakeApi {
    async fn get_address(&mut self, path: &str) -> Result<AddressResponse, DeviceError> {
        self.exchange(Call::GetAddress(path.to_string())).await?;
        Ok(AddressResponse {
            public_key: TEST_PUBLIC_KEY.to_string(),
            address: TEST_ADDRESS.to_string(),
            chain_code: None,
        })
    }

    async fn sign_transaction(
        &mut self,
        path: &str,
        hex_transaction: &str,
    ) -> Result<RawSignature, DeviceError> {
        self.exchange(Call::Sign {
            path: path.to_string(),
            transaction: hex_transaction.to_string(),
        })
        .await?;

        let configured = self.device.raw_signature.lock().unwrap().clone();
        Ok(configured.unwrap_or_else(|| RawSignature {
            v: SIG_V.to_string(),
            r: SIG_R.to_string(),
            s: SIG_S.to_string(),
        }))
    }
}

pub struct FakeFactory {
    device: Arc<FakeDevice>,
}

impl FakeFactory {
    pub fn new(device: Arc<FakeDevice>) -> Self {
        Self { device }
    }
}

#[async_trait]
impl ConnectionFactory for FakeFactory {
    type Api = FakeApi;

    async fn connect(&self) -> Result<FakeApi, DeviceError> {
        self.device.connects.fetch_add(1, Ordering::SeqCst);
        if self.device.fail_connect.load(Ordering::SeqCst) {
            return Err(DeviceError::other("hidapi: unable to open device"));
        }
        Ok(FakeApi {
            device: self.device.clone(),
            mid_exchange: false,
        })
    }
}

/// Recovery handler that records which callbacks ran
#[derive(Clone, Default)]
pub struct RecordingRecovery {
    actions: Arc<Mutex<Vec<RecoveryAction>>>,
    failing: Option<RecoveryAction>,
    delay: Option<Duration>,
}

impl RecordingRecovery {
    pub fn failing_on(action: RecoveryAction) -> Self {
        Self {
            failing: Some(action),
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn actions(&self) -> Vec<RecoveryAction> {
        self.actions.lock().unwrap().clone()
    }

    async fn record(&self, action: RecoveryAction) -> Result<(), BoxError> {
        self.actions.lock().unwrap().push(action);
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        if self.failing == Some(action) {
            return Err(format!("user dismissed the '{action}' prompt").into());
        }
        Ok(())
    }
}

#[async_trait]
impl RecoveryHandler for RecordingRecovery {
    async fn connect_device(&self) -> Result<(), BoxError> {
        self.record(RecoveryAction::ConnectDevice).await
    }

    async fn open_vapory_app(&self) -> Result<(), BoxError> {
        self.record(RecoveryAction::OpenVaporyApp).await
    }

    async fn switch_ledger_mode(&self) -> Result<(), BoxError> {
        self.record(RecoveryAction::SwitchLedgerMode).await
    }

    async fn enable_contract_support(&self) -> Result<(), BoxError> {
        self.record(RecoveryAction::EnableContractSupport).await
    }
}

pub struct TestSetup {
    pub ledger: LedgerVapory<FakeFactory, RecordingRecovery>,
    pub device: Arc<FakeDevice>,
    pub recovery: RecordingRecovery,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with(RecordingRecovery::default(), RetryPolicy::default())
    }

    pub fn with(recovery: RecordingRecovery, policy: RetryPolicy) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let device = Arc::new(FakeDevice::default());
        let ledger = LedgerVapory::new(
            Network::Mainnet,
            FakeFactory::new(device.clone()),
            recovery.clone(),
        )
        .with_retry_policy(policy);

        TestSetup {
            ledger,
            device,
            recovery,
        }
    }
}

pub fn bip44_path(index: u32) -> String {
    format!("m/44'/60'/0'/0/{index}")
}
