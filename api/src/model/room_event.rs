use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use kernel::model::{
    id::{ListingId, RoomEventId, RoomId, UserId},
    room_event::{
        event::CreateRoomEvent, HighDemandEntry, PriceChangeEntry, RoomEvent, RoomEventKind,
    },
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RoomEventType {
    PriceChange,
    HighDemand,
    // 値上げ率を持たない HighDemand として保存される
    BookingClosed,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomEventRequest {
    #[garde(skip)]
    pub listing_id: ListingId,
    // 認証は外部で行われ、作成者の ID はそこから渡される
    #[garde(skip)]
    pub author_id: UserId,
    #[garde(length(min = 1))]
    pub room_ids: Vec<RoomId>,
    #[garde(skip)]
    pub start_date: NaiveDate,
    #[garde(skip)]
    pub end_date: NaiveDate,
    #[garde(skip)]
    #[serde(rename = "type")]
    pub event_type: RoomEventType,
    #[garde(dive)]
    #[serde(default)]
    pub price_change: Vec<PriceChangeEntryRequest>,
    #[garde(dive)]
    #[serde(default)]
    pub high_demand: Vec<HighDemandEntryRequest>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PriceChangeEntryRequest {
    #[garde(skip)]
    pub room_id: RoomId,
    #[garde(range(min = 0.01))]
    pub new_price: f64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HighDemandEntryRequest {
    #[garde(skip)]
    pub room_id: RoomId,
    #[garde(range(min = 0.0, max = 10.0))]
    pub price_increment_percentage: f64,
}

impl CreateRoomEventRequest {
    /// `room_id` は登録先の部屋。`type` と一致しない payload や、
    /// 登録先の部屋を含まない payload は受け付けない
    pub fn into_event(
        self,
        room_id: RoomId,
        created_at: DateTime<Utc>,
    ) -> AppResult<CreateRoomEvent> {
        let CreateRoomEventRequest {
            listing_id,
            author_id,
            room_ids,
            start_date,
            end_date,
            event_type,
            price_change,
            high_demand,
        } = self;

        if !room_ids.contains(&room_id) {
            return Err(AppError::UnprocessableEntity(format!(
                "部屋（{room_id}）がイベントの対象に含まれていません。"
            )));
        }

        let kind = match event_type {
            RoomEventType::PriceChange => {
                reject_other_payload(event_type, high_demand.is_empty())?;
                require_entry_for(
                    event_type,
                    room_id,
                    price_change.iter().map(|e| e.room_id),
                )?;
                RoomEventKind::PriceChange(
                    price_change
                        .into_iter()
                        .map(|e| PriceChangeEntry {
                            room_id: e.room_id,
                            new_price: e.new_price,
                        })
                        .collect(),
                )
            }
            RoomEventType::HighDemand => {
                reject_other_payload(event_type, price_change.is_empty())?;
                require_entry_for(
                    event_type,
                    room_id,
                    high_demand.iter().map(|e| e.room_id),
                )?;
                RoomEventKind::HighDemand(
                    high_demand
                        .into_iter()
                        .map(|e| HighDemandEntry {
                            room_id: e.room_id,
                            price_increment_percentage: e.price_increment_percentage,
                        })
                        .collect(),
                )
            }
            RoomEventType::BookingClosed => {
                reject_other_payload(event_type, price_change.is_empty() && high_demand.is_empty())?;
                RoomEventKind::booking_closed()
            }
        };

        Ok(CreateRoomEvent::new(
            listing_id, author_id, room_ids, start_date, end_date, kind, created_at,
        ))
    }
}

fn reject_other_payload(event_type: RoomEventType, others_empty: bool) -> AppResult<()> {
    if others_empty {
        Ok(())
    } else {
        Err(AppError::UnprocessableEntity(format!(
            "{event_type:?} イベントに他の種別の内容が含まれています。"
        )))
    }
}

fn require_entry_for(
    event_type: RoomEventType,
    room_id: RoomId,
    mut entries: impl Iterator<Item = RoomId>,
) -> AppResult<()> {
    if entries.any(|id| id == room_id) {
        Ok(())
    } else {
        Err(AppError::UnprocessableEntity(format!(
            "{event_type:?} イベントに部屋（{room_id}）の内容がありません。"
        )))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoomEventResponse {
    pub room_event_id: RoomEventId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEventsResponse {
    pub items: Vec<RoomEventResponse>,
}

impl From<Vec<RoomEvent>> for RoomEventsResponse {
    fn from(value: Vec<RoomEvent>) -> Self {
        Self {
            items: value.into_iter().map(RoomEventResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEventResponse {
    pub room_event_id: RoomEventId,
    pub listing_id: ListingId,
    pub author_id: UserId,
    pub room_ids: Vec<RoomId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: RoomEventType,
    pub price_change: Vec<PriceChangeEntry>,
    pub high_demand: Vec<HighDemandEntry>,
}

impl From<RoomEvent> for RoomEventResponse {
    fn from(value: RoomEvent) -> Self {
        let event_type = if value.is_booking_closed() {
            RoomEventType::BookingClosed
        } else {
            match value.kind {
                RoomEventKind::PriceChange(_) => RoomEventType::PriceChange,
                RoomEventKind::HighDemand(_) => RoomEventType::HighDemand,
            }
        };
        let RoomEvent {
            room_event_id,
            listing_id,
            author_id,
            room_ids,
            start_date,
            end_date,
            created_at,
            created_seq: _,
            kind,
        } = value;
        let (price_change, high_demand) = match kind {
            RoomEventKind::PriceChange(entries) => (entries, Vec::new()),
            RoomEventKind::HighDemand(entries) => (Vec::new(), entries),
        };
        Self {
            room_event_id,
            listing_id,
            author_id,
            room_ids,
            start_date,
            end_date,
            created_at,
            event_type,
            price_change,
            high_demand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_converts_to_high_demand_kind() {
        let room_id = RoomId::new();
        let req: CreateRoomEventRequest = serde_json::from_value(json!({
            "listingId": ListingId::new(),
            "authorId": UserId::new(),
            "roomIds": [room_id],
            "startDate": "2024-08-01",
            "endDate": "2024-08-31",
            "type": "HighDemand",
            "highDemand": [{ "roomId": room_id, "priceIncrementPercentage": 0.15 }]
        }))
        .unwrap();
        assert!(req.validate(&()).is_ok());

        let event = req.into_event(room_id, Utc::now()).unwrap();
        assert_eq!(event.kind.type_name(), "HighDemand");
        assert!(event.validate().is_ok());
    }

    fn request(room_id: RoomId, body: serde_json::Value) -> CreateRoomEventRequest {
        let mut base = json!({
            "listingId": ListingId::new(),
            "authorId": UserId::new(),
            "roomIds": [room_id],
            "startDate": "2024-08-01",
            "endDate": "2024-08-31",
        });
        for (k, v) in body.as_object().unwrap() {
            base[k] = v.clone();
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn payload_of_the_other_type_is_rejected() {
        let room_id = RoomId::new();
        let req = request(
            room_id,
            json!({
                "type": "PriceChange",
                "highDemand": [{ "roomId": room_id, "priceIncrementPercentage": 0.5 }]
            }),
        );
        assert!(req.validate(&()).is_ok());
        assert!(matches!(
            req.into_event(room_id, Utc::now()),
            Err(AppError::UnprocessableEntity(_))
        ));

        let req = request(
            room_id,
            json!({
                "type": "HighDemand",
                "priceChange": [{ "roomId": room_id, "newPrice": 120.0 }],
                "highDemand": [{ "roomId": room_id, "priceIncrementPercentage": 0.5 }]
            }),
        );
        assert!(matches!(
            req.into_event(room_id, Utc::now()),
            Err(AppError::UnprocessableEntity(_))
        ));

        let req = request(
            room_id,
            json!({
                "type": "BookingClosed",
                "priceChange": [{ "roomId": room_id, "newPrice": 120.0 }]
            }),
        );
        assert!(req.into_event(room_id, Utc::now()).is_err());
    }

    #[test]
    fn empty_payload_or_missing_entry_for_the_room_is_rejected() {
        let room_id = RoomId::new();
        let req = request(room_id, json!({ "type": "PriceChange" }));
        assert!(req.into_event(room_id, Utc::now()).is_err());

        let req = request(room_id, json!({ "type": "HighDemand", "highDemand": [] }));
        assert!(req.into_event(room_id, Utc::now()).is_err());

        let sibling = RoomId::new();
        let req = request(
            room_id,
            json!({
                "roomIds": [room_id, sibling],
                "type": "PriceChange",
                "priceChange": [{ "roomId": sibling, "newPrice": 120.0 }]
            }),
        );
        assert!(matches!(
            req.into_event(room_id, Utc::now()),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[test]
    fn room_outside_the_event_is_rejected() {
        let room_id = RoomId::new();
        let req = request(room_id, json!({ "type": "BookingClosed" }));
        assert!(req.into_event(RoomId::new(), Utc::now()).is_err());
    }

    #[test]
    fn request_without_rooms_or_with_negative_rate_is_invalid() {
        let room_id = RoomId::new();
        let req: CreateRoomEventRequest = serde_json::from_value(json!({
            "listingId": ListingId::new(),
            "authorId": UserId::new(),
            "roomIds": [],
            "startDate": "2024-08-01",
            "endDate": "2024-08-31",
            "type": "HighDemand",
            "highDemand": [{ "roomId": room_id, "priceIncrementPercentage": -0.5 }]
        }))
        .unwrap();
        assert!(req.validate(&()).is_err());
    }

    #[test]
    fn booking_closed_round_trips_through_response() {
        let room_id = RoomId::new();
        let req: CreateRoomEventRequest = serde_json::from_value(json!({
            "listingId": ListingId::new(),
            "authorId": UserId::new(),
            "roomIds": [room_id],
            "startDate": "2024-08-01",
            "endDate": "2024-08-01",
            "type": "BookingClosed"
        }))
        .unwrap();
        let created = req.into_event(room_id, Utc::now()).unwrap();
        let event = RoomEvent {
            room_event_id: RoomEventId::new(),
            listing_id: created.listing_id,
            author_id: created.author_id,
            room_ids: created.room_ids,
            start_date: created.start_date,
            end_date: created.end_date,
            created_at: created.created_at,
            created_seq: 1,
            kind: created.kind,
        };
        let json = serde_json::to_value(RoomEventResponse::from(event)).unwrap();
        assert_eq!(json["type"], "BookingClosed");
        assert_eq!(json["highDemand"], json!([]));
    }
}
