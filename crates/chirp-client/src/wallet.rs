use thiserror::Error;
use tracing::{debug, info};

/// Capability surface of a browser-injected wallet provider. Detection and
/// connection go through this trait so another provider can be supported
/// without touching call sites.
pub trait WalletProvider {
    fn is_metamask(&self) -> bool;

    fn is_phantom(&self) -> bool {
        false
    }

    fn is_coinbase_wallet(&self) -> bool {
        false
    }

    fn is_brave_wallet(&self) -> bool {
        false
    }

    /// Prompt the user for account access; returns the unlocked accounts.
    fn request_accounts(&self) -> Result<Vec<String>, WalletError>;

    /// Sign an arbitrary message with the given account's key.
    fn sign_message(&self, account: &str, message: &str) -> Result<String, WalletError>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("MetaMask is not installed. Please install MetaMask to continue.")]
    NotInstalled,

    #[error("Phantom wallet detected. Please install and use MetaMask instead.")]
    PhantomDetected,

    #[error("Please use MetaMask wallet. Other wallets are not supported.")]
    UnsupportedProvider,

    #[error("No accounts found")]
    NoAccounts,

    #[error("Wallet not connected")]
    NotConnected,

    #[error("{0}")]
    Provider(String),
}

/// What inspecting the injection point concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    NotInstalled,
    MetaMask,
    Phantom,
    OtherWallet,
}

/// Classify whatever sits at the injection point: trust an explicit
/// MetaMask flag, reject known impostors that mimic the same injection
/// point, and give an unflagged provider the benefit of the doubt.
pub fn detect(injected: Option<&dyn WalletProvider>) -> Detection {
    let Some(provider) = injected else {
        return Detection::NotInstalled;
    };

    if provider.is_metamask() {
        return Detection::MetaMask;
    }
    if provider.is_phantom() {
        return Detection::Phantom;
    }
    if provider.is_coinbase_wallet() || provider.is_brave_wallet() {
        return Detection::OtherWallet;
    }

    // Cannot tell; assume it might be MetaMask.
    Detection::MetaMask
}

/// Wallet connection state machine, independent of the credential session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletState {
    Disconnected,
    Connecting,
    Connected { account: String },
}

pub struct WalletConnection {
    state: WalletState,
}

impl WalletConnection {
    pub fn new() -> Self {
        Self {
            state: WalletState::Disconnected,
        }
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, WalletState::Connected { .. })
    }

    pub fn account(&self) -> Option<&str> {
        match &self.state {
            WalletState::Connected { account } => Some(account),
            _ => None,
        }
    }

    /// Connect through the injected provider, rejecting impostors.
    pub fn connect(
        &mut self,
        injected: Option<&dyn WalletProvider>,
    ) -> Result<String, WalletError> {
        debug!("Inspecting the injected wallet provider");
        let provider = match detect(injected) {
            Detection::NotInstalled => return Err(WalletError::NotInstalled),
            Detection::Phantom => return Err(WalletError::PhantomDetected),
            Detection::OtherWallet => return Err(WalletError::UnsupportedProvider),
            Detection::MetaMask => injected.ok_or(WalletError::NotInstalled)?,
        };

        self.state = WalletState::Connecting;

        let accounts = match provider.request_accounts() {
            Ok(accounts) => accounts,
            Err(err) => {
                self.state = WalletState::Disconnected;
                return Err(err);
            }
        };

        let Some(account) = accounts.into_iter().next() else {
            self.state = WalletState::Disconnected;
            return Err(WalletError::NoAccounts);
        };

        info!("Wallet connected: {}", account);
        self.state = WalletState::Connected {
            account: account.clone(),
        };
        Ok(account)
    }

    pub fn disconnect(&mut self) {
        self.state = WalletState::Disconnected;
    }

    /// Mirror of the provider's accountsChanged event: switching accounts
    /// keeps the connection, an empty list drops it.
    pub fn accounts_changed(&mut self, accounts: &[String]) {
        if !self.is_connected() {
            return;
        }
        match accounts.first() {
            None => self.disconnect(),
            Some(account) => {
                self.state = WalletState::Connected {
                    account: account.clone(),
                }
            }
        }
    }

    /// Sign a message with the connected account.
    pub fn sign_message(
        &self,
        provider: &dyn WalletProvider,
        message: &str,
    ) -> Result<String, WalletError> {
        match &self.state {
            WalletState::Connected { account } => provider.sign_message(account, message),
            _ => Err(WalletError::NotConnected),
        }
    }
}

impl Default for WalletConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProvider {
        metamask: bool,
        phantom: bool,
        coinbase: bool,
        accounts: Vec<String>,
    }

    impl FakeProvider {
        fn metamask(accounts: &[&str]) -> Self {
            Self {
                metamask: true,
                phantom: false,
                coinbase: false,
                accounts: accounts.iter().map(|a| a.to_string()).collect(),
            }
        }

        fn phantom() -> Self {
            Self {
                metamask: false,
                phantom: true,
                coinbase: false,
                accounts: vec!["0xphantom".to_string()],
            }
        }

        fn coinbase() -> Self {
            Self {
                metamask: false,
                phantom: false,
                coinbase: true,
                accounts: vec!["0xcoinbase".to_string()],
            }
        }
    }

    impl WalletProvider for FakeProvider {
        fn is_metamask(&self) -> bool {
            self.metamask
        }

        fn is_phantom(&self) -> bool {
            self.phantom
        }

        fn is_coinbase_wallet(&self) -> bool {
            self.coinbase
        }

        fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
            Ok(self.accounts.clone())
        }

        fn sign_message(&self, account: &str, message: &str) -> Result<String, WalletError> {
            Ok(format!("sig({}, {})", account, message))
        }
    }

    #[test]
    fn nothing_injected_means_not_installed() {
        assert_eq!(detect(None), Detection::NotInstalled);

        let mut wallet = WalletConnection::new();
        assert_eq!(wallet.connect(None), Err(WalletError::NotInstalled));
        assert_eq!(wallet.state(), &WalletState::Disconnected);
    }

    #[test]
    fn phantom_impostor_is_rejected() {
        let provider = FakeProvider::phantom();
        assert_eq!(detect(Some(&provider)), Detection::Phantom);

        let mut wallet = WalletConnection::new();
        assert_eq!(
            wallet.connect(Some(&provider)),
            Err(WalletError::PhantomDetected)
        );
        assert!(!wallet.is_connected());
    }

    #[test]
    fn other_flagged_wallets_are_rejected() {
        let provider = FakeProvider::coinbase();
        assert_eq!(detect(Some(&provider)), Detection::OtherWallet);

        let mut wallet = WalletConnection::new();
        assert_eq!(
            wallet.connect(Some(&provider)),
            Err(WalletError::UnsupportedProvider)
        );
    }

    #[test]
    fn unflagged_provider_gets_the_benefit_of_the_doubt() {
        let provider = FakeProvider {
            metamask: false,
            phantom: false,
            coinbase: false,
            accounts: vec!["0xmystery".to_string()],
        };
        assert_eq!(detect(Some(&provider)), Detection::MetaMask);
    }

    #[test]
    fn connect_lands_on_the_first_account() {
        let provider = FakeProvider::metamask(&["0xaaa", "0xbbb"]);

        let mut wallet = WalletConnection::new();
        let account = wallet.connect(Some(&provider)).unwrap();

        assert_eq!(account, "0xaaa");
        assert!(wallet.is_connected());
        assert_eq!(wallet.account(), Some("0xaaa"));
    }

    #[test]
    fn connect_with_no_accounts_returns_to_disconnected() {
        let provider = FakeProvider::metamask(&[]);

        let mut wallet = WalletConnection::new();
        assert_eq!(
            wallet.connect(Some(&provider)),
            Err(WalletError::NoAccounts)
        );
        assert_eq!(wallet.state(), &WalletState::Disconnected);
    }

    #[test]
    fn accounts_changed_switches_or_disconnects() {
        let provider = FakeProvider::metamask(&["0xaaa"]);
        let mut wallet = WalletConnection::new();
        wallet.connect(Some(&provider)).unwrap();

        wallet.accounts_changed(&["0xccc".to_string()]);
        assert_eq!(wallet.account(), Some("0xccc"));

        wallet.accounts_changed(&[]);
        assert!(!wallet.is_connected());
    }

    #[test]
    fn signing_requires_a_connection() {
        let provider = FakeProvider::metamask(&["0xaaa"]);
        let mut wallet = WalletConnection::new();

        assert_eq!(
            wallet.sign_message(&provider, "hello"),
            Err(WalletError::NotConnected)
        );

        wallet.connect(Some(&provider)).unwrap();
        assert_eq!(
            wallet.sign_message(&provider, "hello").unwrap(),
            "sig(0xaaa, hello)"
        );
    }
}
