/// Application constants

// API version
pub const API_VERSION: &str = "v1";

// Chain unit configuration
pub const DEFAULT_NATIVE_SYMBOL: &str = "ETH";
pub const DEFAULT_NATIVE_DECIMALS: u32 = 18;
// 10^78 overflows a u256, so no asset can scale past this exponent.
pub const MAX_UNIT_DECIMALS: u32 = 77;

// ERC-20 transfer(address,uint256)
pub const ERC20_TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

// Upstream error bodies are capped before they reach API responses
pub const ERROR_REASON_MAX_CHARS: usize = 200;

// Remote parser client
pub const DEFAULT_PARSER_TIMEOUT_SECS: u64 = 30;
