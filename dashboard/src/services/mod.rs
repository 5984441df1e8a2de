pub mod region_poller;
