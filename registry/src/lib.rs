use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::repository::{
    health::HealthCheckRepositoryImpl, room::RoomRepositoryImpl,
    room_event::RoomEventRepositoryImpl, transaction::TransactionRepositoryImpl,
};
use kernel::clock::{Clock, SystemClock};
use kernel::pricing::service::{RetryPolicy, RoomPricer};
use kernel::repository::{
    health::HealthCheckRepository, room::RoomRepository, room_event::RoomEventRepository,
    transaction::TransactionRepository,
};
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    room_repository: Arc<dyn RoomRepository>,
    room_event_repository: Arc<dyn RoomEventRepository>,
    transaction_repository: Arc<dyn TransactionRepository>,
    clock: Arc<dyn Clock>,
    room_pricer: RoomPricer,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, app_config: &AppConfig) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let room_repository: Arc<dyn RoomRepository> =
            Arc::new(RoomRepositoryImpl::new(pool.clone()));
        let room_event_repository: Arc<dyn RoomEventRepository> =
            Arc::new(RoomEventRepositoryImpl::new(pool.clone()));
        let transaction_repository = Arc::new(TransactionRepositoryImpl::new(pool.clone()));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let room_pricer = RoomPricer::new(
            room_repository.clone(),
            room_event_repository.clone(),
            clock.clone(),
            RetryPolicy {
                max_attempts: app_config.pricing.max_attempts,
            },
        );
        Self {
            health_check_repository,
            room_repository,
            room_event_repository,
            transaction_repository,
            clock,
            room_pricer,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn room_repository(&self) -> Arc<dyn RoomRepository> {
        self.room_repository.clone()
    }

    pub fn room_event_repository(&self) -> Arc<dyn RoomEventRepository> {
        self.room_event_repository.clone()
    }

    pub fn transaction_repository(&self) -> Arc<dyn TransactionRepository> {
        self.transaction_repository.clone()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn room_pricer(&self) -> &RoomPricer {
        &self.room_pricer
    }
}
