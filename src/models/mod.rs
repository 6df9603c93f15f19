pub mod address;
pub mod call;
pub mod record;
pub mod session;

pub use address::Address;
pub use call::{CallArg, CallValue, ContractCall, Method, TxHash};
pub use record::{ReceiptStatus, RecordKey, TransactionRecord, TxKind, TxStatus};
pub use session::{SessionAction, SessionCommand};
