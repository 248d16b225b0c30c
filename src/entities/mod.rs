pub mod inventory_item;
