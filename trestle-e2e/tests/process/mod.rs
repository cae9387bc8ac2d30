mod t001_spawned;
