use tonic::{Request, Response, Status};

use crate::db::owner_from_request;
use crate::ledger::Ledger;
use crate::models::{ItemPatch, NewItem};
use crate::proto::common::Empty;
use crate::proto::inventory::inventory_service_server::InventoryService;
use crate::proto::inventory::{
    Availability, CheckCodeReq, CheckCodeRes, CreateItemReq, DeleteItemReq, GetItemReq, ItemRes,
    ListItemsReq, ListItemsRes, UpdateItemReq,
};
use crate::services::convert::{
    item_to_proto, parse_id, parse_optional_date, parse_optional_id,
};

pub struct InventoryServiceImpl {
    ledger: Ledger,
}

impl InventoryServiceImpl {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    fn non_empty(value: String) -> Option<String> {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

#[tonic::async_trait]
impl InventoryService for InventoryServiceImpl {
    async fn create_item(&self, request: Request<CreateItemReq>) -> Result<Response<ItemRes>, Status> {
        let owner_id = owner_from_request(&request)?;
        let req = request.into_inner();

        let attrs = NewItem {
            name: req.name,
            code: req.code,
            quantity: req.quantity,
            category: req.category,
            condition: req.condition,
            location: Self::non_empty(req.location),
            acquired_on: parse_optional_date("acquired_on", &req.acquired_on)?,
            description: Self::non_empty(req.description),
        };
        let item = self.ledger.create_item(owner_id, attrs).await?;
        let view = self.ledger.get_item(owner_id, item.id).await?;

        Ok(Response::new(ItemRes {
            item: Some(item_to_proto(&view)),
        }))
    }

    async fn get_item(&self, request: Request<GetItemReq>) -> Result<Response<ItemRes>, Status> {
        let owner_id = owner_from_request(&request)?;
        let id = parse_id("id", &request.get_ref().id)?;

        let view = self.ledger.get_item(owner_id, id).await?;
        Ok(Response::new(ItemRes {
            item: Some(item_to_proto(&view)),
        }))
    }

    async fn list_items(&self, request: Request<ListItemsReq>) -> Result<Response<ListItemsRes>, Status> {
        let owner_id = owner_from_request(&request)?;
        let req = request.into_inner();

        let items = self.ledger.list_items(owner_id, Some(req.category.as_str())).await?;
        Ok(Response::new(ListItemsRes {
            items: items.iter().map(item_to_proto).collect(),
        }))
    }

    async fn update_item(&self, request: Request<UpdateItemReq>) -> Result<Response<ItemRes>, Status> {
        let owner_id = owner_from_request(&request)?;
        let req = request.into_inner();
        let id = parse_id("id", &req.id)?;

        let acquired_on = req
            .acquired_on
            .map(|date| parse_optional_date("acquired_on", &date))
            .transpose()?;
        let patch = ItemPatch {
            name: req.name,
            code: req.code,
            quantity: req.quantity,
            category: req.category,
            condition: req.condition,
            location: req.location,
            acquired_on,
            description: req.description,
        };
        self.ledger.update_item(owner_id, id, patch).await?;
        let view = self.ledger.get_item(owner_id, id).await?;

        Ok(Response::new(ItemRes {
            item: Some(item_to_proto(&view)),
        }))
    }

    async fn delete_item(&self, request: Request<DeleteItemReq>) -> Result<Response<Empty>, Status> {
        let owner_id = owner_from_request(&request)?;
        let id = parse_id("id", &request.get_ref().id)?;

        self.ledger.delete_item(owner_id, id).await?;
        Ok(Response::new(Empty {}))
    }

    async fn get_availability(&self, request: Request<GetItemReq>) -> Result<Response<Availability>, Status> {
        let owner_id = owner_from_request(&request)?;
        let id = parse_id("id", &request.get_ref().id)?;

        let avail = self.ledger.availability(owner_id, id).await?;
        Ok(Response::new(Availability {
            item_id: avail.item_id.to_string(),
            total_quantity: avail.total,
            borrowed_quantity: avail.borrowed,
            available_quantity: avail.available(),
        }))
    }

    async fn check_code(&self, request: Request<CheckCodeReq>) -> Result<Response<CheckCodeRes>, Status> {
        let owner_id = owner_from_request(&request)?;
        let req = request.into_inner();
        let exclude = parse_optional_id("exclude_id", &req.exclude_id)?;

        let check = self.ledger.check_code(owner_id, &req.code, exclude).await?;
        Ok(Response::new(CheckCodeRes {
            duplicate: check.is_duplicate(),
            existing_id: check.existing_id.map(|id| id.to_string()).unwrap_or_default(),
            normalized: check.normalized,
        }))
    }
}
