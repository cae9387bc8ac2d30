mod t001_client_server;
mod t002_occupied_port;
