use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::tokens::TokenSigner;
use crate::config::Config;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub signer: TokenSigner,
}
