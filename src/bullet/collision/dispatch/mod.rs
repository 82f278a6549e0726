pub mod collision_dispatcher;
