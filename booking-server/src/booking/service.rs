//! 预订业务服务
//!
//! Booking transaction, payment confirmation and cancellation. This is
//! the only code path that writes the reservation ledger, and every
//! write for one logical showtime runs under that showtime's
//! single-writer lock.

use crate::booking::availability::AvailabilityResolver;
use crate::booking::code::generate_code;
use crate::booking::locks::ShowtimeLocks;
use crate::booking::origin::{EXTERNAL_PREFIX, ShowtimeOrigin};
use crate::booking::resolver::ShowtimeResolver;
use crate::catalog::CatalogStore;
use crate::core::Config;
use crate::db::models::Booking;
use crate::db::repository::{
    BookingRepository, MemberRepository, MovieRepository, ShowtimeRepository, TheaterRepository,
};
use crate::realtime::SeatFanout;
use crate::utils::{AppError, AppResult};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use shared::{AddonSelection, BookingStatus, PaymentMethod, SeatEvent, TicketClass};
use std::collections::HashSet;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// 收敛后的新预订请求体
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    /// 逻辑场次 ID（`showtime:<key>` 或 `sql_<n>`）
    pub showtime_id: String,
    pub seats: Vec<String>,
    #[serde(default)]
    pub ticket_class: TicketClass,
    #[serde(default)]
    pub addons: AddonSelection,
    /// 下单时声明要抵扣的积分（支付时才实际扣除）
    #[serde(default)]
    pub points_to_redeem: i64,
}

/// 座位可用性快照
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityView {
    pub showtime_id: String,
    pub total_seats: i32,
    pub available_seats: i32,
    /// 按账本扫描得出的已占座位，排序去重
    pub taken_seats: Vec<String>,
}

const MAX_CODE_ATTEMPTS: usize = 5;

/// 预订服务 - 订座核心的唯一入口
#[derive(Clone)]
pub struct BookingService {
    config: Arc<Config>,
    bookings: BookingRepository,
    showtimes: ShowtimeRepository,
    members: MemberRepository,
    resolver: ShowtimeResolver,
    availability: AvailabilityResolver,
    catalog: CatalogStore,
    fanout: Arc<SeatFanout>,
    locks: Arc<ShowtimeLocks>,
}

impl BookingService {
    pub fn new(
        config: Arc<Config>,
        db: Surreal<Db>,
        catalog: CatalogStore,
        fanout: Arc<SeatFanout>,
    ) -> Self {
        let showtimes = ShowtimeRepository::new(db.clone());
        let bookings = BookingRepository::new(db.clone());
        let resolver = ShowtimeResolver::new(
            showtimes.clone(),
            MovieRepository::new(db.clone()),
            TheaterRepository::new(db.clone()),
            catalog.clone(),
        );
        Self {
            config,
            availability: AvailabilityResolver::new(bookings.clone()),
            bookings,
            showtimes,
            members: MemberRepository::new(db),
            resolver,
            catalog,
            fanout,
            locks: Arc::new(ShowtimeLocks::new()),
        }
    }

    /// 创建预订（pending 状态）
    ///
    /// 检查与写入全程持有该场次的单写者锁，并发请求同一场次时
    /// 串行执行，后到者会看到先到者刚写入的座位。
    pub async fn create_booking(&self, user: &str, req: BookingRequest) -> AppResult<Booking> {
        self.validate_request(&req)?;
        let origin = ShowtimeOrigin::parse(&req.showtime_id)?;

        // Lock before resolving: two first-bookings racing on the same
        // external showtime would otherwise both construct a mirror.
        let _guard = self.locks.acquire(&origin.lock_key()).await;

        let showtime = self.resolver.resolve(&origin).await?;
        if !showtime.is_active {
            return Err(AppError::Inactive(format!(
                "Showtime {} is not active",
                origin
            )));
        }
        let showtime_id = showtime
            .id
            .clone()
            .ok_or_else(|| AppError::internal("showtime record without id"))?;

        let taken = self.availability.taken_seats(&showtime_id).await?;
        let conflicts: Vec<String> = req
            .seats
            .iter()
            .filter(|s| taken.contains(s))
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            return Err(AppError::SeatConflict(conflicts));
        }
        if taken.len() + req.seats.len() > showtime.total_seats as usize {
            return Err(AppError::InsufficientCapacity(format!(
                "Showtime {} has {} seats left",
                origin,
                (showtime.total_seats as usize).saturating_sub(taken.len())
            )));
        }

        let total_price = self.total_price(
            showtime.price,
            req.ticket_class,
            req.seats.len(),
            &req.addons,
        )?;
        if req.points_to_redeem > total_price {
            return Err(AppError::validation(
                "Points to redeem exceed the booking total",
            ));
        }
        if req.points_to_redeem > 0 {
            let balance = self.members.points(user).await?;
            if balance < req.points_to_redeem {
                return Err(AppError::InsufficientPoints(format!(
                    "Balance {} is less than requested {}",
                    balance, req.points_to_redeem
                )));
            }
        }

        let booking_code = self.unique_code().await?;
        let booking = Booking {
            id: None,
            user: user.to_string(),
            showtime: showtime_id,
            seats: req.seats.clone(),
            ticket_class: req.ticket_class,
            addons: req.addons,
            total_price,
            status: BookingStatus::Pending,
            payment_method: None,
            booking_code,
            points_earned: 0,
            points_used: req.points_to_redeem,
            created_at: Utc::now(),
            paid_at: None,
        };
        let created = self.bookings.create(booking).await?;

        // 账本已是事实来源；两个余座计数器只做尽力同步
        if let ShowtimeOrigin::External(catalog_id) = &origin {
            let count = req.seats.len() as i64;
            self.catalog
                .decrement_available(*catalog_id, count)
                .await
                .log("booking");
            self.sync_mirror_counter(&created.showtime, -(req.seats.len() as i32))
                .await;
        }

        let delivered = self.fanout.publish(SeatEvent::SeatsTaken {
            showtime_id: origin.logical_id(),
            seats: req.seats.clone(),
        });
        tracing::info!(
            user,
            showtime = %origin,
            seats = ?req.seats,
            code = %created.booking_code,
            delivered,
            "booking created"
        );
        Ok(created)
    }

    /// 确认支付：pending → paid
    ///
    /// 此时才真正扣除下单时声明的积分，并按实付金额返还新积分。
    /// 与下单共用同一把场次锁：状态检查到写入之间不允许并发的
    /// 支付或取消插进来。
    pub async fn confirm_payment(
        &self,
        user: &str,
        booking_id: &str,
        method: PaymentMethod,
    ) -> AppResult<Booking> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {} not found", booking_id)))?;
        if booking.user != user {
            return Err(AppError::Unauthorized);
        }

        let showtime = self.showtimes.find_by_id(&booking.showtime).await?;
        let lock_key = Self::logical_showtime_id(showtime.as_ref(), &booking.showtime);
        let _guard = self.locks.acquire(&lock_key).await;

        // 锁内重读：并发的支付/取消可能已推进状态
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {} not found", booking_id)))?;
        if booking.status != BookingStatus::Pending {
            return Err(AppError::AlreadyProcessed(format!(
                "Booking {} is {}",
                booking.booking_code, booking.status
            )));
        }
        let id = booking
            .id
            .clone()
            .ok_or_else(|| AppError::internal("booking record without id"))?;

        // 积分在下单时只做校验，余额可能在此期间被花掉，重新检查
        if booking.points_used > 0 {
            let balance = self.members.points(user).await?;
            if balance < booking.points_used {
                return Err(AppError::InsufficientPoints(format!(
                    "Balance {} is less than reserved {}",
                    balance, booking.points_used
                )));
            }
            self.members.adjust_points(user, -booking.points_used).await?;
        }

        let points_earned = self.earned_points(booking.total_price)?;
        if points_earned > 0 {
            self.members.adjust_points(user, points_earned).await?;
        }

        // 原生场次的余座在支付时才扣减；镜像场次在下单时已同步过
        if let Some(showtime) = &showtime {
            if !showtime.is_mirror() {
                self.sync_mirror_counter(&booking.showtime, -(booking.seats.len() as i32))
                    .await;
            }
        }

        let paid = self
            .bookings
            .mark_paid(&id, method, points_earned, Utc::now())
            .await?;
        tracing::info!(
            user,
            code = %paid.booking_code,
            ?method,
            points_earned,
            points_used = booking.points_used,
            "payment confirmed"
        );
        Ok(paid)
    }

    /// 取消预订：仅 pending 可取消
    ///
    /// 积分在支付时才扣除，所以取消 pending 预订无需退还积分。
    /// 同样在场次锁内检查并写入，防止与并发支付互相穿插。
    pub async fn cancel_booking(&self, user: &str, booking_id: &str) -> AppResult<Booking> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {} not found", booking_id)))?;
        if booking.user != user {
            return Err(AppError::Unauthorized);
        }

        let showtime = self.showtimes.find_by_id(&booking.showtime).await?;
        let logical_id = Self::logical_showtime_id(showtime.as_ref(), &booking.showtime);
        let _guard = self.locks.acquire(&logical_id).await;

        // 锁内重读：并发的支付/取消可能已推进状态
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {} not found", booking_id)))?;
        if booking.status != BookingStatus::Pending {
            return Err(AppError::NotCancellable(format!(
                "Booking {} is {}",
                booking.booking_code, booking.status
            )));
        }
        let id = booking
            .id
            .clone()
            .ok_or_else(|| AppError::internal("booking record without id"))?;

        let cancelled = self.bookings.mark_cancelled(&id).await?;

        // 镜像场次在下单时扣过两边计数器，取消时归还
        if let Some(catalog_id) = showtime.as_ref().and_then(|st| st.catalog_id.as_deref()) {
            if let Ok(catalog_row) = catalog_id.parse::<i64>() {
                self.catalog
                    .increment_available(catalog_row, booking.seats.len() as i64)
                    .await
                    .log("cancellation");
            }
            self.sync_mirror_counter(&booking.showtime, booking.seats.len() as i32)
                .await;
        }

        self.fanout.publish(SeatEvent::SeatsReleased {
            showtime_id: logical_id,
            seats: booking.seats.clone(),
        });
        tracing::info!(user, code = %cancelled.booking_code, "booking cancelled");
        Ok(cancelled)
    }

    /// 可用性快照（只读，绝不创建镜像）
    ///
    /// `available_seats` 以账本扫描为准，不信任 advisory 计数器。
    pub async fn get_availability(&self, raw_id: &str) -> AppResult<AvailabilityView> {
        let origin = ShowtimeOrigin::parse(raw_id)?;
        let facts = self.resolver.peek(&origin).await?;

        let taken = match &facts.ledger_ref {
            Some(showtime_id) => self.availability.taken_seats(showtime_id).await?,
            // 无账本记录意味着从未有人预订过
            None => Vec::new(),
        };
        let available = (facts.total_seats - taken.len() as i32).max(0);

        Ok(AvailabilityView {
            showtime_id: facts.logical_id,
            total_seats: facts.total_seats,
            available_seats: available,
            taken_seats: taken,
        })
    }

    /// 用户预订历史，默认展示仍然有效的预订
    pub async fn my_bookings(
        &self,
        user: &str,
        statuses: Option<Vec<BookingStatus>>,
    ) -> AppResult<Vec<Booking>> {
        let statuses = statuses.unwrap_or_else(|| {
            vec![
                BookingStatus::Pending,
                BookingStatus::Paid,
                BookingStatus::Completed,
            ]
        });
        Ok(self.bookings.find_by_user(user, &statuses).await?)
    }

    /// 单条预订详情（仅本人可见）
    pub async fn get_booking(&self, user: &str, booking_id: &str) -> AppResult<Booking> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {} not found", booking_id)))?;
        if booking.user != user {
            return Err(AppError::Unauthorized);
        }
        Ok(booking)
    }

    // ========== internals ==========

    fn validate_request(&self, req: &BookingRequest) -> AppResult<()> {
        if req.seats.is_empty() {
            return Err(AppError::validation("At least one seat is required"));
        }
        if req.seats.len() > self.config.max_seats_per_booking {
            return Err(AppError::validation(format!(
                "At most {} seats per booking",
                self.config.max_seats_per_booking
            )));
        }
        if req.seats.iter().any(|s| s.trim().is_empty()) {
            return Err(AppError::validation("Seat labels must not be empty"));
        }
        let unique: HashSet<&String> = req.seats.iter().collect();
        if unique.len() != req.seats.len() {
            return Err(AppError::validation("Duplicate seat labels in request"));
        }
        if req.points_to_redeem < 0 {
            return Err(AppError::validation("Points to redeem must not be negative"));
        }
        if req.addons.addon_price < 0 {
            return Err(AppError::validation("Addon price must not be negative"));
        }
        Ok(())
    }

    /// 票价 = 单价 × 票档倍率 × 座位数 + 加购，四舍五入到整 VND
    fn total_price(
        &self,
        unit_price: i64,
        class: TicketClass,
        seat_count: usize,
        addons: &AddonSelection,
    ) -> AppResult<i64> {
        let tickets = Decimal::from(unit_price)
            * self.config.class_multiplier(class)
            * Decimal::from(seat_count as u64);
        let total = tickets + Decimal::from(addons.addon_price);
        total
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| AppError::internal("booking total overflows i64"))
    }

    /// 实付金额按比例返还积分，四舍五入
    fn earned_points(&self, total_price: i64) -> AppResult<i64> {
        (Decimal::from(total_price) * self.config.loyalty_earn_rate)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| AppError::internal("earned points overflow i64"))
    }

    /// 碰撞检查 + 有界重试的预订码生成
    async fn unique_code(&self) -> AppResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code();
            if self.bookings.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
        Err(AppError::internal(
            "Failed to generate a unique booking code",
        ))
    }

    /// The origin-form id clients address a showtime by. Doubles as
    /// the per-showtime lock key, so payment/cancel serialize against
    /// bookings on the same logical showtime.
    fn logical_showtime_id(
        showtime: Option<&crate::db::models::Showtime>,
        ledger_ref: &surrealdb::RecordId,
    ) -> String {
        match showtime.and_then(|st| st.catalog_id.as_deref()) {
            Some(catalog_id) => format!("{EXTERNAL_PREFIX}{catalog_id}"),
            None => ledger_ref.to_string(),
        }
    }

    /// Best-effort sync of the document-store seat counter. The clamp
    /// lives in the query; failures are logged and swallowed because
    /// the ledger already holds the truth.
    async fn sync_mirror_counter(&self, showtime: &surrealdb::RecordId, delta: i32) {
        if let Err(e) = self.showtimes.adjust_available(showtime, delta).await {
            tracing::warn!(showtime = %showtime, delta, error = %e, "seat counter sync failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DocStore;
    use crate::db::models::Showtime;
    use chrono::NaiveDate;
    use surrealdb::RecordId;

    async fn native_showtime(db: &Surreal<Db>, is_active: bool) -> RecordId {
        let repo = ShowtimeRepository::new(db.clone());
        let created = repo
            .create(Showtime {
                id: None,
                movie: RecordId::from_table_key("movie", "m1"),
                theater: RecordId::from_table_key("theater", "t1"),
                date: NaiveDate::from_ymd_opt(2026, 9, 5).unwrap(),
                time: "18:00".to_string(),
                price: 120000,
                total_seats: 60,
                available_seats: 60,
                is_active,
                catalog_id: None,
            })
            .await
            .unwrap();
        created.id.unwrap()
    }

    async fn fixture() -> (BookingService, CatalogStore, Surreal<Db>) {
        let doc = DocStore::memory().await.unwrap();
        let catalog = CatalogStore::memory().await.unwrap();
        sqlx::query("INSERT INTO movies (title, duration) VALUES ('Dune III', 155)")
            .execute(&catalog.pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO theaters (name, address, city) VALUES ('Galaxy Central', '1 Main St', 'HCMC')",
        )
        .execute(&catalog.pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO showtimes (movie_id, theater_id, show_date, show_time, price, total_seats, available_seats) \
             VALUES (1, 1, '2026-09-01', '19:30', 100000, 100, 100)",
        )
        .execute(&catalog.pool)
        .await
        .unwrap();

        let config = Arc::new(Config::default());
        let fanout = Arc::new(SeatFanout::new(config.fanout_capacity));
        let service = BookingService::new(config, doc.db.clone(), catalog.clone(), fanout);
        (service, catalog, doc.db.clone())
    }

    fn request(seats: &[&str], class: TicketClass) -> BookingRequest {
        BookingRequest {
            showtime_id: "sql_1".to_string(),
            seats: seats.iter().map(|s| s.to_string()).collect(),
            ticket_class: class,
            addons: AddonSelection::default(),
            points_to_redeem: 0,
        }
    }

    #[tokio::test]
    async fn vip_pricing_applies_multiplier_per_seat() {
        let (service, _, _) = fixture().await;
        let booking = service
            .create_booking("u1", request(&["A1", "A2", "A3"], TicketClass::Vip))
            .await
            .unwrap();
        // 100000 × 1.5 × 3
        assert_eq!(booking.total_price, 450000);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.booking_code.starts_with("BK"));
    }

    #[tokio::test]
    async fn addon_price_is_added_verbatim() {
        let (service, _, _) = fixture().await;
        let mut req = request(&["B1"], TicketClass::Standard);
        req.addons = AddonSelection {
            popcorn: 1,
            drink: 2,
            addon_price: 75000,
        };
        let booking = service.create_booking("u1", req).await.unwrap();
        assert_eq!(booking.total_price, 175000);
    }

    #[tokio::test]
    async fn overlapping_seats_conflict_with_exact_labels() {
        let (service, _, _) = fixture().await;
        service
            .create_booking("u1", request(&["A1", "A2", "A3"], TicketClass::Standard))
            .await
            .unwrap();

        let err = service
            .create_booking("u2", request(&["A3", "B1"], TicketClass::Standard))
            .await;
        match err {
            Err(AppError::SeatConflict(seats)) => assert_eq!(seats, vec!["A3"]),
            other => panic!("expected SeatConflict, got {:?}", other.map(|b| b.booking_code)),
        }
    }

    #[tokio::test]
    async fn cancelled_seats_can_be_rebooked() {
        let (service, _, _) = fixture().await;
        let booking = service
            .create_booking("u1", request(&["A1", "A2"], TicketClass::Standard))
            .await
            .unwrap();
        let id = booking.id.unwrap().to_string();
        service.cancel_booking("u1", &id).await.unwrap();

        let view = service.get_availability("sql_1").await.unwrap();
        assert!(view.taken_seats.is_empty());
        assert_eq!(view.available_seats, 100);

        service
            .create_booking("u2", request(&["A1"], TicketClass::Standard))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn payment_is_single_shot() {
        let (service, _, _) = fixture().await;
        let booking = service
            .create_booking("u1", request(&["C1"], TicketClass::Standard))
            .await
            .unwrap();
        let id = booking.id.unwrap().to_string();

        let paid = service
            .confirm_payment("u1", &id, PaymentMethod::Card)
            .await
            .unwrap();
        assert_eq!(paid.status, BookingStatus::Paid);
        // 1% of 100000
        assert_eq!(paid.points_earned, 1000);
        assert!(paid.paid_at.is_some());

        let again = service.confirm_payment("u1", &id, PaymentMethod::Card).await;
        assert!(matches!(again, Err(AppError::AlreadyProcessed(_))));
    }

    #[tokio::test]
    async fn paid_bookings_are_not_cancellable() {
        let (service, _, _) = fixture().await;
        let booking = service
            .create_booking("u1", request(&["D1"], TicketClass::Standard))
            .await
            .unwrap();
        let id = booking.id.unwrap().to_string();
        service
            .confirm_payment("u1", &id, PaymentMethod::Cash)
            .await
            .unwrap();

        let err = service.cancel_booking("u1", &id).await;
        assert!(matches!(err, Err(AppError::NotCancellable(_))));
    }

    #[tokio::test]
    async fn other_users_cannot_touch_a_booking() {
        let (service, _, _) = fixture().await;
        let booking = service
            .create_booking("u1", request(&["E1"], TicketClass::Standard))
            .await
            .unwrap();
        let id = booking.id.unwrap().to_string();

        assert!(matches!(
            service.confirm_payment("intruder", &id, PaymentMethod::Cash).await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            service.cancel_booking("intruder", &id).await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            service.get_booking("intruder", &id).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn points_are_verified_at_booking_and_deducted_at_payment() {
        let (service, _, db) = fixture().await;
        let members = MemberRepository::new(db);
        members.adjust_points("u1", 50000).await.unwrap();

        let mut req = request(&["F1"], TicketClass::Standard);
        req.points_to_redeem = 30000;
        let booking = service.create_booking("u1", req).await.unwrap();
        assert_eq!(booking.points_used, 30000);
        // 校验不扣减
        assert_eq!(members.points("u1").await.unwrap(), 50000);

        let id = booking.id.unwrap().to_string();
        service
            .confirm_payment("u1", &id, PaymentMethod::Wallet)
            .await
            .unwrap();
        // 50000 - 30000 + 1% × 100000
        assert_eq!(members.points("u1").await.unwrap(), 21000);
    }

    #[tokio::test]
    async fn redeeming_more_than_the_balance_is_rejected() {
        let (service, _, _) = fixture().await;
        let mut req = request(&["G1"], TicketClass::Standard);
        req.points_to_redeem = 500;
        let err = service.create_booking("broke-user", req).await;
        assert!(matches!(err, Err(AppError::InsufficientPoints(_))));
    }

    #[tokio::test]
    async fn request_validation_rejects_bad_shapes() {
        let (service, _, _) = fixture().await;

        let empty = request(&[], TicketClass::Standard);
        assert!(matches!(
            service.create_booking("u1", empty).await,
            Err(AppError::Validation(_))
        ));

        let dup = request(&["A1", "A1"], TicketClass::Standard);
        assert!(matches!(
            service.create_booking("u1", dup).await,
            Err(AppError::Validation(_))
        ));

        let over = request(
            &["A1", "A2", "A3", "A4", "A5", "A6", "A7", "A8", "A9"],
            TicketClass::Standard,
        );
        assert!(matches!(
            service.create_booking("u1", over).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn booking_keeps_the_relational_counter_in_step() {
        let (service, catalog, _) = fixture().await;
        service
            .create_booking("u1", request(&["A1", "A2"], TicketClass::Standard))
            .await
            .unwrap();
        let row = catalog.fetch_showtime(1).await.unwrap().unwrap();
        assert_eq!(row.available_seats, 98);
    }

    #[tokio::test]
    async fn booking_and_cancel_keep_the_mirror_counter_in_step() {
        let (service, _, db) = fixture().await;
        let showtimes = ShowtimeRepository::new(db.clone());

        let booking = service
            .create_booking("u1", request(&["A1", "A2"], TicketClass::Standard))
            .await
            .unwrap();
        let mirror = showtimes.find_by_catalog_id("1").await.unwrap().unwrap();
        assert_eq!(mirror.available_seats, 98);

        service
            .cancel_booking("u1", &booking.id.unwrap().to_string())
            .await
            .unwrap();
        let mirror = showtimes.find_by_catalog_id("1").await.unwrap().unwrap();
        assert_eq!(mirror.available_seats, 100);
    }

    #[tokio::test]
    async fn concurrent_payments_settle_points_once() {
        let (service, _, db) = fixture().await;
        let members = MemberRepository::new(db);
        let booking = service
            .create_booking("u1", request(&["J1"], TicketClass::Standard))
            .await
            .unwrap();
        let id = booking.id.unwrap().to_string();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = service.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                service.confirm_payment("u1", &id, PaymentMethod::Card).await
            }));
        }

        let mut successes = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(paid) => {
                    assert_eq!(paid.status, BookingStatus::Paid);
                    successes += 1;
                }
                Err(AppError::AlreadyProcessed(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(successes, 1);
        // 1% × 100000，只返还一次
        assert_eq!(members.points("u1").await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn concurrent_cancel_and_pay_agree_on_one_outcome() {
        let (service, _, _) = fixture().await;
        let booking = service
            .create_booking("u1", request(&["K1"], TicketClass::Standard))
            .await
            .unwrap();
        let id = booking.id.unwrap().to_string();

        let pay = {
            let service = service.clone();
            let id = id.clone();
            tokio::spawn(async move { service.confirm_payment("u1", &id, PaymentMethod::Cash).await })
        };
        let cancel = {
            let service = service.clone();
            let id = id.clone();
            tokio::spawn(async move { service.cancel_booking("u1", &id).await })
        };

        let paid = pay.await.unwrap();
        let cancelled = cancel.await.unwrap();
        // 恰好一方赢，输家看到对方已推进的状态
        assert!(paid.is_ok() != cancelled.is_ok());

        let stored = service.get_booking("u1", &id).await.unwrap();
        if paid.is_ok() {
            assert_eq!(stored.status, BookingStatus::Paid);
            assert!(matches!(cancelled, Err(AppError::NotCancellable(_))));
        } else {
            assert_eq!(stored.status, BookingStatus::Cancelled);
            assert!(matches!(paid, Err(AppError::AlreadyProcessed(_))));
        }
    }

    #[tokio::test]
    async fn native_showtimes_book_and_decrement_at_payment() {
        let (service, _, db) = fixture().await;
        let sid = native_showtime(&db, true).await;
        let showtimes = ShowtimeRepository::new(db.clone());

        let booking = service
            .create_booking("u1", BookingRequest {
                showtime_id: sid.to_string(),
                seats: vec!["A1".into(), "A2".into()],
                ticket_class: TicketClass::Standard,
                addons: AddonSelection::default(),
                points_to_redeem: 0,
            })
            .await
            .unwrap();
        assert_eq!(booking.total_price, 240000);

        // 下单不动原生计数器，可用性以账本为准
        assert_eq!(
            showtimes.find_by_id(&sid).await.unwrap().unwrap().available_seats,
            60
        );
        let view = service.get_availability(&sid.to_string()).await.unwrap();
        assert_eq!(view.taken_seats, vec!["A1", "A2"]);
        assert_eq!(view.available_seats, 58);

        // 支付时才扣减原生计数器
        service
            .confirm_payment("u1", &booking.id.unwrap().to_string(), PaymentMethod::Cash)
            .await
            .unwrap();
        assert_eq!(
            showtimes.find_by_id(&sid).await.unwrap().unwrap().available_seats,
            58
        );
    }

    #[tokio::test]
    async fn inactive_native_showtime_is_rejected() {
        let (service, _, db) = fixture().await;
        let sid = native_showtime(&db, false).await;

        let err = service
            .create_booking("u1", BookingRequest {
                showtime_id: sid.to_string(),
                seats: vec!["A1".into()],
                ticket_class: TicketClass::Standard,
                addons: AddonSelection::default(),
                points_to_redeem: 0,
            })
            .await;
        assert!(matches!(err, Err(AppError::Inactive(_))));
    }

    #[tokio::test]
    async fn availability_read_reflects_ledger_not_counters() {
        let (service, catalog, _) = fixture().await;
        service
            .create_booking("u1", request(&["A1", "A2"], TicketClass::Standard))
            .await
            .unwrap();
        // 人为打乱 advisory 计数器
        sqlx::query("UPDATE showtimes SET available_seats = 3 WHERE id = 1")
            .execute(&catalog.pool)
            .await
            .unwrap();

        let view = service.get_availability("sql_1").await.unwrap();
        assert_eq!(view.taken_seats, vec!["A1", "A2"]);
        assert_eq!(view.available_seats, 98);
    }

    #[tokio::test]
    async fn availability_of_an_unbooked_external_showtime_is_empty() {
        let (service, _, _) = fixture().await;
        let view = service.get_availability("sql_1").await.unwrap();
        assert!(view.taken_seats.is_empty());
        assert_eq!(view.total_seats, 100);
        assert_eq!(view.available_seats, 100);
    }

    #[tokio::test]
    async fn history_defaults_to_live_bookings() {
        let (service, _, _) = fixture().await;
        let kept = service
            .create_booking("u1", request(&["H1"], TicketClass::Standard))
            .await
            .unwrap();
        let dropped = service
            .create_booking("u1", request(&["H2"], TicketClass::Standard))
            .await
            .unwrap();
        service
            .cancel_booking("u1", &dropped.id.unwrap().to_string())
            .await
            .unwrap();

        let history = service.my_bookings("u1", None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].booking_code, kept.booking_code);

        let cancelled = service
            .my_bookings("u1", Some(vec![BookingStatus::Cancelled]))
            .await
            .unwrap();
        assert_eq!(cancelled.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_bookings_for_one_seat_yield_one_winner() {
        let (service, _, _) = fixture().await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .create_booking(&format!("u{i}"), request(&["A3"], TicketClass::Standard))
                    .await
            }));
        }

        let mut winners = 0;
        let mut conflicts = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => winners += 1,
                Err(AppError::SeatConflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(conflicts, 7);
    }
}
