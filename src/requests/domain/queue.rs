use std::collections::{HashMap, HashSet};
use chrono::NaiveDateTime;
use crate::core::events::{DomainEvent, DomainEventType};
use crate::core::library::{LibraryError, LibraryResult, ReasonCode, RequestStatus, RequestType};
use crate::core::transaction::ChangeSet;
use crate::requests::domain::model::RequestEntity;
use crate::requests::dto::RequestDto;
use crate::requests::repository::{REQUESTS_KEY, REQUESTS_TABLE};

const REQUEST_EVENTS: &str = "requests";

// RequestQueue is the working copy of one item's open requests for a single operation.
// It is loaded under the item lock, mutated in memory and staged into the operation's
// ChangeSet once, so a request is never written twice in the same transaction.
#[derive(Debug)]
pub(crate) struct RequestQueue {
    item_id: String,
    open: Vec<RequestEntity>,
    closed: Vec<RequestEntity>,
    created: HashSet<String>,
    dirty: HashSet<String>,
    transitions: Vec<(&'static str, DomainEventType, String)>,
}

impl RequestQueue {
    pub fn new(item_id: &str, requests: Vec<RequestEntity>) -> LibraryResult<Self> {
        let mut open: Vec<RequestEntity> = requests.into_iter()
            .filter(|r| r.is_open() && r.item_id == item_id)
            .collect();
        open.sort_by(|a, b| a.queue_position.cmp(&b.queue_position)
            .then(a.request_date.cmp(&b.request_date))
            .then(a.sequence.cmp(&b.sequence)));
        let queue = Self {
            item_id: item_id.to_string(),
            open,
            closed: vec![],
            created: HashSet::new(),
            dirty: HashSet::new(),
            transitions: vec![],
        };
        queue.check_positions()?;
        Ok(queue)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn head(&self) -> Option<&RequestEntity> {
        self.open.first()
    }

    pub fn requests(&self) -> &[RequestEntity] {
        &self.open
    }

    pub fn positions(&self) -> Vec<i64> {
        self.open.iter().map(|r| r.queue_position).collect()
    }

    pub fn find_by_patron(&self, patron_id: &str) -> Option<&RequestEntity> {
        self.open.iter().find(|r| r.patron_id == patron_id)
    }

    // enqueue appends in submission order. With recall_priority a recall is placed after the
    // last request that is already promoted or is itself a recall, ahead of waiting holds and
    // pages; this is the only exception to FIFO.
    pub fn enqueue(&mut self, request: RequestEntity, recall_priority: bool) -> i64 {
        let index = if recall_priority && request.request_type == RequestType::Recall {
            self.open.iter()
                .rposition(|r| r.request_status != RequestStatus::OpenNotYetFilled || r.request_type == RequestType::Recall)
                .map(|i| i + 1)
                .unwrap_or(0)
        } else {
            self.open.len()
        };
        let request_id = request.request_id.to_string();
        self.created.insert(request_id.to_string());
        self.dirty.insert(request_id.to_string());
        self.transitions.push(("request_created", DomainEventType::Added, request_id));
        self.open.insert(index, request);
        self.recompact();
        index as i64 + 1
    }

    // close moves an open request to a terminal status and closes the gap it leaves
    pub fn close(&mut self, request_id: &str, status: RequestStatus, now: NaiveDateTime) -> LibraryResult<RequestEntity> {
        let index = self.open.iter().position(|r| r.request_id == request_id).ok_or_else(|| {
            LibraryError::not_found(
                format!("request {} is not queued for item {}", request_id, self.item_id).as_str(),
                ReasonCode::RequestNotFound)
        })?;
        self.open[index].close(status, now)?;
        let request = self.open.remove(index);
        let name = match status {
            RequestStatus::ClosedFilled => "request_filled",
            RequestStatus::ClosedPickupExpired => "request_pickup_expired",
            _ => "request_cancelled",
        };
        self.dirty.insert(request.request_id.to_string());
        self.transitions.push((name, DomainEventType::Closed, request.request_id.to_string()));
        self.closed.push(request.clone());
        self.recompact();
        Ok(request)
    }

    // promote makes the head request ready for its patron once the item is free. Expired
    // requests at the head are closed and skipped. When `location` is given and differs from
    // the pickup service point the request goes in transit instead.
    pub fn promote(&mut self, now: NaiveDateTime, hold_shelf_days: i64, location: Option<&str>) -> LibraryResult<Option<RequestEntity>> {
        loop {
            let (request_id, expired) = match self.open.first() {
                Some(head) if head.request_status == RequestStatus::OpenNotYetFilled => {
                    (head.request_id.to_string(), head.is_expired(now))
                }
                _ => return Ok(None),
            };
            if expired {
                self.close(request_id.as_str(), RequestStatus::ClosedPickupExpired, now)?;
                continue;
            }
            let head = &mut self.open[0];
            let name = match location {
                Some(sp) if sp != head.pickup_service_point_id => {
                    head.send_in_transit()?;
                    "request_in_transit"
                }
                _ => {
                    head.await_pickup(now, hold_shelf_days)?;
                    "request_awaiting_pickup"
                }
            };
            let promoted = head.clone();
            self.dirty.insert(request_id.to_string());
            self.transitions.push((name, DomainEventType::Updated, request_id));
            return Ok(Some(promoted));
        }
    }

    // receive completes the transit of the head request at its pickup service point
    pub fn receive(&mut self, service_point_id: &str, now: NaiveDateTime, hold_shelf_days: i64) -> LibraryResult<RequestEntity> {
        let head = self.open.first_mut()
            .filter(|h| h.request_status == RequestStatus::OpenInTransit)
            .ok_or_else(|| LibraryError::not_found(
                format!("no request in transit for item {}", self.item_id).as_str(), ReasonCode::RequestNotFound))?;
        if head.pickup_service_point_id != service_point_id {
            return Err(LibraryError::validation(
                format!("request {} is picked up at {} not {}",
                        head.request_id, head.pickup_service_point_id, service_point_id).as_str(), None));
        }
        head.await_pickup(now, hold_shelf_days)?;
        let received = head.clone();
        self.dirty.insert(received.request_id.to_string());
        self.transitions.push(("request_awaiting_pickup", DomainEventType::Updated, received.request_id.to_string()));
        Ok(received)
    }

    // stage writes every changed request once and queues an event per transition. Returns the
    // ids of the requests that stay open, in queue order.
    pub fn stage(self, changes: &mut ChangeSet, branch_id: &str) -> LibraryResult<Vec<String>> {
        self.check_positions()?;
        let RequestQueue { mut open, mut closed, created, dirty, transitions, .. } = self;
        let mut staged: HashMap<String, RequestDto> = HashMap::new();
        for request in closed.iter_mut().chain(open.iter_mut()) {
            if !dirty.contains(&request.request_id) {
                continue;
            }
            if created.contains(&request.request_id) {
                changes.create(REQUESTS_TABLE, REQUESTS_KEY, &*request)?;
            } else {
                changes.update(REQUESTS_TABLE, REQUESTS_KEY, request)?;
            }
            staged.insert(request.request_id.to_string(), RequestDto::from(&*request));
        }
        for (name, kind, request_id) in transitions {
            let dto = staged.get(&request_id).ok_or_else(|| LibraryError::invariant(
                format!("request {} changed without being staged", request_id).as_str(), ReasonCode::QueueCorrupted))?;
            let metadata = HashMap::from([
                ("branch_id".to_string(), branch_id.to_string()),
                ("item_id".to_string(), dto.item_id.to_string()),
                ("patron_id".to_string(), dto.patron_id.to_string()),
            ]);
            let event = match kind {
                DomainEventType::Added => DomainEvent::added(name, REQUEST_EVENTS, request_id.as_str(), &metadata, dto)?,
                DomainEventType::Updated => DomainEvent::updated(name, REQUEST_EVENTS, request_id.as_str(), &metadata, dto)?,
                DomainEventType::Closed => DomainEvent::closed(name, REQUEST_EVENTS, request_id.as_str(), &metadata, dto)?,
            };
            changes.publish(event);
        }
        Ok(open.iter().map(|r| r.request_id.to_string()).collect())
    }

    fn recompact(&mut self) {
        for (i, request) in self.open.iter_mut().enumerate() {
            let position = i as i64 + 1;
            if request.queue_position != position {
                request.queue_position = position;
                self.dirty.insert(request.request_id.to_string());
            }
        }
    }

    fn check_positions(&self) -> LibraryResult<()> {
        for (i, request) in self.open.iter().enumerate() {
            if request.queue_position != i as i64 + 1 {
                return Err(LibraryError::invariant(
                    format!("queue of item {} has positions {:?}", self.item_id, self.positions()).as_str(),
                    ReasonCode::QueueCorrupted));
            }
        }
        Ok(())
    }
}
