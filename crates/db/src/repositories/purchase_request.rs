//! Purchase request repository.
//!
//! Creation, field edits, line items, deletion and the visibility-scoped
//! listings. None of these methods change `status`; that belongs to
//! [`super::WorkflowRepository`].

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    TransactionTrait,
};
use tracing::{info, warn};

use procura_core::request::{
    NewPurchaseRequest, NewRequestItem, RequestUpdate, validate_item, validate_new_request,
    validate_update,
};
use procura_core::workflow::{
    Action, Actor, AuthorizationPolicy, LifecycleEngine, RequestStatus as CoreStatus, UserRole,
    VisibilityScope, WorkflowError,
};
use procura_shared::types::{PageRequest, PageResponse, RequestId, RequestItemId, UserId};

use super::convert::{core_status_to_db, db_err, load_actor, load_request, snapshot};
use crate::entities::{
    approvals, attachments, purchase_requests, receipt_validations, request_items,
    sea_orm_active_enums::RequestStatus,
};

/// A request together with everything it owns.
#[derive(Debug, Clone)]
pub struct RequestDetail {
    /// The request row.
    pub request: purchase_requests::Model,
    /// Line items in insertion order.
    pub items: Vec<request_items::Model>,
    /// Approval decisions, oldest first.
    pub approvals: Vec<approvals::Model>,
    /// Attachments, oldest first.
    pub attachments: Vec<attachments::Model>,
    /// Finance's receipt validation, once recorded.
    pub receipt_validation: Option<receipt_validations::Model>,
}

impl RequestDetail {
    /// Sum of `price × quantity` over all line items.
    #[must_use]
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(request_items::Model::total).sum()
    }
}

/// Purchase request repository.
#[derive(Debug, Clone)]
pub struct PurchaseRequestRepository {
    db: DatabaseConnection,
}

impl PurchaseRequestRepository {
    /// Creates a new purchase request repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Submits a new request and its line items. The request starts at
    /// `pending_l1`.
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed input
    /// - `UserNotFound` if the creator does not exist
    /// - `NotAuthorized` if the creator's role may not submit requests
    pub async fn create(
        &self,
        created_by: UserId,
        input: NewPurchaseRequest,
    ) -> Result<RequestDetail, WorkflowError> {
        validate_new_request(&input)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let actor = load_actor(&txn, created_by).await?;
        if !AuthorizationPolicy::can_create(&actor) {
            warn!(user_id = %created_by, role = %actor.role, "request creation denied");
            return Err(WorkflowError::NotAuthorized {
                role: actor.role,
                action: Action::Create,
            });
        }

        let now = Utc::now().into();
        let request = purchase_requests::ActiveModel {
            id: Set(RequestId::new().into_inner()),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            amount: Set(input.amount),
            quantity: Set(input.quantity),
            department: Set(input.department),
            vendor_name: Set(input.vendor_name),
            category: Set(input.category),
            urgency: Set(input.urgency),
            status: Set(RequestStatus::PendingL1),
            created_by: Set(created_by.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in input.items {
            items.push(insert_item(&txn, request.id, item).await?);
        }

        txn.commit().await.map_err(db_err)?;

        info!(
            request_id = %request.id,
            created_by = %created_by,
            items = items.len(),
            "purchase request created"
        );

        Ok(RequestDetail {
            request,
            items,
            approvals: Vec::new(),
            attachments: Vec::new(),
            receipt_validation: None,
        })
    }

    /// Finds a request by ID without any visibility check.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: RequestId,
    ) -> Result<Option<purchase_requests::Model>, WorkflowError> {
        purchase_requests::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Loads a request with its items, approvals, attachments and receipt
    /// validation, if the viewer's visibility scope includes it.
    ///
    /// # Errors
    ///
    /// - `RequestNotFound` / `UserNotFound`
    /// - `NotAuthorized` if the request is outside the viewer's scope
    pub async fn find_detail(
        &self,
        viewer: UserId,
        id: RequestId,
    ) -> Result<RequestDetail, WorkflowError> {
        let request = load_request(&self.db, id).await?;
        let actor = load_actor(&self.db, viewer).await?;
        AuthorizationPolicy::authorize(&actor, &snapshot(&request), Action::View)?;

        let items = self.list_items(id).await?;
        let approvals = self.list_approvals(id).await?;
        let attachments = attachments::Entity::find()
            .filter(attachments::Column::RequestId.eq(request.id))
            .order_by_asc(attachments::Column::UploadedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let receipt_validation = receipt_validations::Entity::find()
            .filter(receipt_validations::Column::RequestId.eq(request.id))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(RequestDetail {
            request,
            items,
            approvals,
            attachments,
            receipt_validation,
        })
    }

    /// Updates the fields of a request that is still `pending_l1`.
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed input
    /// - `NotAuthorized` unless the editor is the creator or an admin
    /// - `InvalidState` once the request has left `pending_l1`, including
    ///   when a decision lands between the read and the write
    pub async fn update(
        &self,
        editor: UserId,
        id: RequestId,
        update: RequestUpdate,
    ) -> Result<purchase_requests::Model, WorkflowError> {
        validate_update(&update)?;

        let request = load_request(&self.db, id).await?;
        let actor = load_actor(&self.db, editor).await?;
        ensure_can_edit(&actor, &request)?;

        let mut active = purchase_requests::ActiveModel {
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        if let Some(title) = update.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = update.description {
            active.description = Set(description);
        }
        if let Some(amount) = update.amount {
            active.amount = Set(amount);
        }
        if let Some(quantity) = update.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(department) = update.department {
            active.department = Set(department);
        }
        if let Some(vendor_name) = update.vendor_name {
            active.vendor_name = Set(vendor_name);
        }
        if let Some(category) = update.category {
            active.category = Set(category);
        }
        if let Some(urgency) = update.urgency {
            active.urgency = Set(urgency);
        }

        let result = purchase_requests::Entity::update_many()
            .set(active)
            .filter(purchase_requests::Column::Id.eq(request.id))
            .filter(purchase_requests::Column::Status.eq(RequestStatus::PendingL1))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(stale_edit(&self.db, id).await);
        }

        info!(request_id = %request.id, editor = %editor, "purchase request updated");
        load_request(&self.db, id).await
    }

    /// Deletes a request together with its items, approvals, attachments and
    /// receipt validation, in one transaction. Allowed in any status.
    ///
    /// # Errors
    ///
    /// - `RequestNotFound` / `UserNotFound`
    /// - `NotAuthorized` unless the actor is the creator or an admin
    pub async fn delete(&self, actor_id: UserId, id: RequestId) -> Result<(), WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let request = load_request(&txn, id).await?;
        let actor = load_actor(&txn, actor_id).await?;
        AuthorizationPolicy::authorize(&actor, &snapshot(&request), Action::Delete)
            .inspect_err(|_| warn!(request_id = %request.id, user_id = %actor_id, "delete denied"))?;

        receipt_validations::Entity::delete_many()
            .filter(receipt_validations::Column::RequestId.eq(request.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        attachments::Entity::delete_many()
            .filter(attachments::Column::RequestId.eq(request.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        approvals::Entity::delete_many()
            .filter(approvals::Column::RequestId.eq(request.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        request_items::Entity::delete_many()
            .filter(request_items::Column::RequestId.eq(request.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        purchase_requests::Entity::delete_by_id(request.id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(request_id = %request.id, deleted_by = %actor_id, "purchase request deleted");
        Ok(())
    }

    /// Adds a line item to a request that is still `pending_l1`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update`].
    pub async fn add_item(
        &self,
        editor: UserId,
        request_id: RequestId,
        item: NewRequestItem,
    ) -> Result<request_items::Model, WorkflowError> {
        validate_item(&item)?;

        let txn = self.db.begin().await.map_err(db_err)?;
        let request = load_request(&txn, request_id).await?;
        let actor = load_actor(&txn, editor).await?;
        ensure_can_edit(&actor, &request)?;
        touch_editable(&txn, request_id).await?;

        let item = insert_item(&txn, request.id, item).await?;
        txn.commit().await.map_err(db_err)?;

        info!(request_id = %request.id, item_id = %item.id, "request item added");
        Ok(item)
    }

    /// Removes a line item from a request that is still `pending_l1`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update`], plus `ItemNotFound` if the item does not
    /// belong to the request.
    pub async fn remove_item(
        &self,
        editor: UserId,
        request_id: RequestId,
        item_id: RequestItemId,
    ) -> Result<(), WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let request = load_request(&txn, request_id).await?;
        let actor = load_actor(&txn, editor).await?;
        ensure_can_edit(&actor, &request)?;
        touch_editable(&txn, request_id).await?;

        let result = request_items::Entity::delete_many()
            .filter(request_items::Column::Id.eq(item_id.into_inner()))
            .filter(request_items::Column::RequestId.eq(request.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(WorkflowError::ItemNotFound(item_id.into_inner()));
        }

        txn.commit().await.map_err(db_err)?;

        info!(request_id = %request.id, item_id = %item_id, "request item removed");
        Ok(())
    }

    /// Line items of a request in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_items(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<request_items::Model>, WorkflowError> {
        request_items::Entity::find()
            .filter(request_items::Column::RequestId.eq(request_id.into_inner()))
            .order_by_asc(request_items::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Approval decisions of a request, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_approvals(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<approvals::Model>, WorkflowError> {
        approvals::Entity::find()
            .filter(approvals::Column::RequestId.eq(request_id.into_inner()))
            .order_by_asc(approvals::Column::DecidedAt)
            .order_by_asc(approvals::Column::Level)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Requests in the viewer's visibility scope, newest first. A `status`
    /// narrows the result within that scope; it never widens it.
    ///
    /// # Errors
    ///
    /// `UserNotFound` if the viewer does not exist.
    pub async fn visible_requests(
        &self,
        viewer: UserId,
        status: Option<CoreStatus>,
    ) -> Result<Vec<purchase_requests::Model>, WorkflowError> {
        let actor = load_actor(&self.db, viewer).await?;
        scoped(VisibilityScope::for_actor(&actor), status)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// One page of [`Self::visible_requests`].
    ///
    /// # Errors
    ///
    /// `UserNotFound` if the viewer does not exist.
    pub async fn visible_requests_page(
        &self,
        viewer: UserId,
        status: Option<CoreStatus>,
        page: PageRequest,
    ) -> Result<PageResponse<purchase_requests::Model>, WorkflowError> {
        let actor = load_actor(&self.db, viewer).await?;
        let query = scoped(VisibilityScope::for_actor(&actor), status);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let data = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(
            data,
            page.page_number(),
            page.page_size(),
            total,
        ))
    }

    /// The approver's queue: requests waiting at the approver's level.
    /// Empty for every other role.
    ///
    /// # Errors
    ///
    /// `UserNotFound` if the user does not exist.
    pub async fn pending_approvals(
        &self,
        approver: UserId,
    ) -> Result<Vec<purchase_requests::Model>, WorkflowError> {
        let actor = load_actor(&self.db, approver).await?;
        let status = match actor.role {
            UserRole::Approver1 => CoreStatus::PendingL1,
            UserRole::Approver2 => CoreStatus::PendingL2,
            UserRole::Staff | UserRole::Finance | UserRole::Admin => return Ok(Vec::new()),
        };

        scoped(VisibilityScope::Status(status), None)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Requests the user has decided on, newest first.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user does not exist
    /// - `NotAuthorized` unless the user is an approver or an admin
    pub async fn my_approvals(
        &self,
        approver: UserId,
    ) -> Result<Vec<purchase_requests::Model>, WorkflowError> {
        let actor = load_actor(&self.db, approver).await?;
        if !AuthorizationPolicy::can_review_decisions(&actor) {
            return Err(WorkflowError::NotAuthorized {
                role: actor.role,
                action: Action::View,
            });
        }

        purchase_requests::Entity::find()
            .join(
                JoinType::InnerJoin,
                purchase_requests::Relation::Approvals.def(),
            )
            .filter(approvals::Column::ApproverId.eq(approver.into_inner()))
            .distinct()
            .order_by_desc(purchase_requests::Column::CreatedAt)
            .order_by_desc(purchase_requests::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

/// Base query for a visibility scope, optionally narrowed to one status,
/// newest first.
fn scoped(
    scope: VisibilityScope,
    status: Option<CoreStatus>,
) -> Select<purchase_requests::Entity> {
    let mut condition = match scope {
        VisibilityScope::CreatedBy(user) => {
            Condition::all().add(purchase_requests::Column::CreatedBy.eq(user.into_inner()))
        }
        VisibilityScope::Status(status) => {
            Condition::all().add(purchase_requests::Column::Status.eq(core_status_to_db(status)))
        }
        VisibilityScope::All => Condition::all(),
    };
    if let Some(status) = status {
        condition =
            condition.add(purchase_requests::Column::Status.eq(core_status_to_db(status)));
    }

    purchase_requests::Entity::find()
        .filter(condition)
        .order_by_desc(purchase_requests::Column::CreatedAt)
        .order_by_desc(purchase_requests::Column::Id)
}

/// Ownership first, then status: an owner editing a decided request gets
/// `InvalidState`, a stranger gets `NotAuthorized`.
fn ensure_can_edit(
    actor: &Actor,
    request: &purchase_requests::Model,
) -> Result<(), WorkflowError> {
    let snapshot = snapshot(request);
    if snapshot.created_by != actor.id && actor.role != UserRole::Admin {
        warn!(request_id = %request.id, user_id = %actor.id, "edit denied");
        return Err(WorkflowError::NotAuthorized {
            role: actor.role,
            action: Action::Edit,
        });
    }
    LifecycleEngine::ensure_editable(snapshot.status)
}

/// Bumps `updated_at` only while the request is `pending_l1`. Inside a
/// transaction this orders item edits against a concurrent decision.
async fn touch_editable<C: ConnectionTrait>(
    conn: &C,
    request_id: RequestId,
) -> Result<(), WorkflowError> {
    let result = purchase_requests::Entity::update_many()
        .set(purchase_requests::ActiveModel {
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        })
        .filter(purchase_requests::Column::Id.eq(request_id.into_inner()))
        .filter(purchase_requests::Column::Status.eq(RequestStatus::PendingL1))
        .exec(conn)
        .await
        .map_err(db_err)?;

    if result.rows_affected == 0 {
        return Err(stale_edit(conn, request_id).await);
    }
    Ok(())
}

/// Error for an edit whose conditional write matched no row.
async fn stale_edit<C: ConnectionTrait>(conn: &C, request_id: RequestId) -> WorkflowError {
    match load_request(conn, request_id).await {
        Ok(current) => {
            warn!(request_id = %current.id, status = ?current.status, "edit lost race with a decision");
            WorkflowError::InvalidState {
                status: snapshot(&current).status,
                action: Action::Edit,
            }
        }
        Err(e) => e,
    }
}

async fn insert_item<C: ConnectionTrait>(
    conn: &C,
    request_id: uuid::Uuid,
    item: NewRequestItem,
) -> Result<request_items::Model, WorkflowError> {
    request_items::ActiveModel {
        id: Set(RequestItemId::new().into_inner()),
        request_id: Set(request_id),
        item_name: Set(item.item_name.trim().to_string()),
        price: Set(item.price),
        quantity: Set(item.quantity),
    }
    .insert(conn)
    .await
    .map_err(db_err)
}
